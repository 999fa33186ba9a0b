//! Roles and patient operations.
//!
//! This module defines the closed set of roles a principal can hold and the
//! operations that can be attempted against patient records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role carried by an account and by every session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// The system owner. Approves hospitals and sees every tenant.
    SuperAdmin,
    /// Staff account bound to exactly one hospital.
    HospitalAdmin,
    /// Portal account bound to exactly one patient record.
    Patient,
}

impl Role {
    /// Returns the wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::HospitalAdmin => "HOSPITAL_ADMIN",
            Role::Patient => "PATIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations that can be performed on patient records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create a new record.
    Create,
    /// Read a single record.
    Read,
    /// List records.
    List,
    /// Update an existing record.
    Update,
    /// Delete a record.
    Delete,
}

impl Operation {
    /// Returns `true` for operations that do not modify data.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Operation::Read | Operation::List)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::List => write!(f, "list"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}
