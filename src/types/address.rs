//! Email addresses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address with an optional display name.
///
/// No syntax validation is performed; an address only has to carry a
/// non-empty email where the message requires one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Display name (may be empty).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Address {
    /// Creates a new address.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns true if the address has an email.
    pub fn is_present(&self) -> bool {
        !self.email.is_empty()
    }

    /// Formats the address as `Name <email>`, or the bare email when the
    /// name is empty.
    pub fn format(&self) -> String {
        if self.name.is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }

    /// Formats a list of addresses as a comma separated string.
    pub fn join(addresses: &[Address]) -> String {
        addresses
            .iter()
            .map(Address::format)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
