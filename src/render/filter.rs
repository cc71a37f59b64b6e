// bird-conf: Configuration generator for the BIRD routing daemon
// Copyright (C) 2024 The bird-conf Authors
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Named filters.

use indexmap::IndexMap;
use itertools::Itertools;

use super::{Render, Target};
use crate::{
    fragment::FragmentKind,
    types::{InstanceName, ValidationError},
};

/// A named filter. The body is written verbatim, preceded by the constant definitions and the
/// variable declarations in the order in which they were added.
///
/// ```
/// # use bird_conf::render::{Filter, Render};
/// assert_eq!(
///     Filter::new("only_short", "{\n  if net.len > 24 then reject;\n  accept;\n}")
///         .define("max_len", "24")
///         .variable("cnt", "int")
///         .render_content()
///         .unwrap(),
///     "
/// filter only_short
/// define max_len = 24;
/// int cnt;
/// {
///   if net.len > 24 then reject;
///   accept;
/// }
/// "
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    name: String,
    body: String,
    defines: IndexMap<String, String>,
    variables: IndexMap<String, String>,
    target: Target,
}

impl Filter {
    /// Create a new filter without any definitions or variables, written to the default target.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            defines: IndexMap::new(),
            variables: IndexMap::new(),
            target: Target::default(),
        }
    }

    /// Add a constant definition `define <name> = <value>;`. Redefining an existing constant keeps
    /// its original position.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.defines.insert(name.into(), value.into());
        self
    }

    /// Add a variable declaration `<ty> <name>;`, e.g., `variable("ps", "pair set")` renders as
    /// `pair set ps;`.
    pub fn variable(&mut self, name: impl Into<String>, ty: impl Into<String>) -> &mut Self {
        self.variables.insert(name.into(), ty.into());
        self
    }

    /// Replace all constant definitions.
    pub fn defines(&mut self, defines: IndexMap<String, String>) -> &mut Self {
        self.defines = defines;
        self
    }

    /// Replace all variable declarations (mapping from variable name to its type).
    pub fn variables(&mut self, variables: IndexMap<String, String>) -> &mut Self {
        self.variables = variables;
        self
    }

    /// Set the output target.
    pub fn write_to(&mut self, target: Target) -> &mut Self {
        self.target = target;
        self
    }

    /// Check that every definition and variable uses a valid symbol.
    fn validate_symbols(&self) -> Result<(), ValidationError> {
        let check = |field: &'static str, symbol: &str, value: &str| {
            if InstanceName::new(symbol).is_err() {
                Err(ValidationError::InvalidSymbol {
                    instance: self.name.clone(),
                    field,
                    symbol: symbol.to_string(),
                })
            } else if value.trim().is_empty() {
                Err(ValidationError::EmptyField {
                    instance: self.name.clone(),
                    field,
                })
            } else {
                Ok(())
            }
        };
        self.defines
            .iter()
            .try_for_each(|(k, v)| check("defines", k.as_str(), v.as_str()))?;
        self.variables
            .iter()
            .try_for_each(|(k, v)| check("variables", k.as_str(), v.as_str()))
    }
}

impl Render for Filter {
    fn kind(&self) -> FragmentKind {
        FragmentKind::Filter
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn target(&self) -> &Target {
        &self.target
    }

    fn render_content(&self) -> Result<String, ValidationError> {
        let name = InstanceName::new(self.name.as_str())?;
        if self.body.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                instance: self.name.clone(),
                field: "body",
            });
        }
        self.validate_symbols()?;

        let declarations = self
            .defines
            .iter()
            .map(|(k, v)| format!("define {k} = {v};\n"))
            .chain(
                self.variables
                    .iter()
                    .map(|(var, ty)| format!("{ty} {var};\n")),
            )
            .join("");

        // the next fragment brings its own blank line, so the body must end the line.
        let newline = if self.body.ends_with('\n') { "" } else { "\n" };

        Ok(format!(
            "\nfilter {name}\n{declarations}{body}{newline}",
            body = self.body
        ))
    }
}
