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

//! Module containing the validated scalar types shared by all renderers.

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// Allowed characters in instance names and BIRD symbols.
    static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

/// AS Number, valid in the full 32-bit range (RFC 6793), excluding the reserved AS 0.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct AsNumber(u32);

impl AsNumber {
    /// Create a new AS number, checking that it lies in `1..=4294967295`. `instance` is only used
    /// to report the offending declaration.
    ///
    /// ```
    /// # use bird_conf::types::AsNumber;
    /// assert_eq!(AsNumber::new("peer", 65000).unwrap().get(), 65000);
    /// assert!(AsNumber::new("peer", 0).is_err());
    /// assert!(AsNumber::new("peer", 1 << 32).is_err());
    /// ```
    pub fn new(instance: impl AsRef<str>, value: i64) -> Result<Self, ValidationError> {
        match u32::try_from(value) {
            Ok(x) if x > 0 => Ok(Self(x)),
            _ => Err(ValidationError::AsNumberOutOfRange {
                instance: instance.as_ref().to_string(),
                value,
            }),
        }
    }

    /// Get the raw number.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Display for AsNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Name of a declared instance. It only contains ASCII letters, digits and underscores, such that
/// it can be used both as a BIRD symbol and as part of a fragment identifier.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub struct InstanceName(String);

impl InstanceName {
    /// Validate and wrap the name.
    ///
    /// ```
    /// # use bird_conf::types::InstanceName;
    /// assert!(InstanceName::new("uplink_1").is_ok());
    /// assert!(InstanceName::new("up-link").is_err());
    /// assert!(InstanceName::new("").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            Err(ValidationError::EmptyField {
                instance: name,
                field: "name",
            })
        } else if NAME_RE.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(ValidationError::InvalidName(name))
        }
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for InstanceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error raised while rendering an instance. Nothing is produced once this error is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The name contains characters other than ASCII letters, digits and underscores.
    #[error("Invalid instance name {0:?}: only letters, digits and '_' are allowed")]
    InvalidName(String),
    /// A required field is empty.
    #[error("Instance {instance:?}: the field `{field}` must not be empty")]
    EmptyField {
        /// Offending instance
        instance: String,
        /// Name of the empty field
        field: &'static str,
    },
    /// The AS number is outside of the valid 32-bit range.
    #[error("Instance {instance:?}: AS number {value} is outside of the range 1..=4294967295")]
    AsNumberOutOfRange {
        /// Offending instance
        instance: String,
        /// The number that was given
        value: i64,
    },
    /// The router id is not a dotted-quad.
    #[error("Invalid router id {0:?}: expected a dotted-quad such as 172.16.254.254")]
    InvalidRouterId(String),
    /// The neighbor address cannot be parsed as an IP address.
    #[error("Instance {instance:?}: invalid neighbor address {address:?}")]
    InvalidAddress {
        /// Offending instance
        instance: String,
        /// The address that was given
        address: String,
    },
    /// A filter declaration is not a valid BIRD symbol.
    #[error("Filter {instance:?}: invalid symbol {symbol:?} in {field}")]
    InvalidSymbol {
        /// Offending instance
        instance: String,
        /// Field containing the symbol (`defines` or `variables`)
        field: &'static str,
        /// The symbol
        symbol: String,
    },
    /// The instance should be written to the conf.d directory, but none was configured.
    #[error("Instance {0:?} uses the confd output mode, but no `confd_dir` is configured")]
    MissingConfdDir(String),
}

impl ValidationError {
    /// Get the name of the instance that caused the error, if any.
    pub fn instance(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidName(n)
            | ValidationError::EmptyField { instance: n, .. }
            | ValidationError::AsNumberOutOfRange { instance: n, .. }
            | ValidationError::InvalidAddress { instance: n, .. }
            | ValidationError::InvalidSymbol { instance: n, .. }
            | ValidationError::MissingConfdDir(n) => Some(n),
            ValidationError::InvalidRouterId(_) => None,
        }
    }
}
