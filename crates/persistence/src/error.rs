//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the persistence layer,
//! following a hierarchy that separates missing records, access denials,
//! validation failures, uniqueness conflicts, and backend failures.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::tenant::{Operation, Role};
use crate::types::HospitalStatus;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Record lookup errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Role and tenant access errors
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Uniqueness conflicts
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Shorthand for a [`ResourceError::NotFound`].
    pub fn not_found(resource_type: &str, id: impl Into<String>) -> Self {
        StorageError::Resource(ResourceError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.into(),
        })
    }

    /// Returns `true` if this error means the record does not exist for the caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Resource(ResourceError::NotFound { .. }))
    }
}

/// Errors related to locating records.
///
/// A record outside the caller's scope is reported as `NotFound`, exactly
/// as if it did not exist.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The requested record was not found (or is outside the caller's scope).
    #[error("{resource_type} not found: {id}")]
    NotFound { resource_type: String, id: String },

    /// No patient carries the given QR token. Carries no detail about the token.
    #[error("invalid QR code")]
    TokenNotFound,
}

/// Errors related to role and tenant access.
#[derive(Error, Debug)]
pub enum AccessError {
    /// The principal's role may not perform this operation.
    #[error("role {role} may not {operation} patients")]
    Forbidden { role: Role, operation: Operation },

    /// The route requires a different role.
    #[error("access denied: {required} role required")]
    RoleRequired { required: Role, actual: Role },

    /// The principal is missing the tenant reference its role requires.
    #[error("no hospital associated with this account")]
    MissingTenant,
}

/// Errors related to document validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A field is present but malformed or out of range.
    #[error("invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    /// The hospital status change is not allowed by the lifecycle.
    #[error("hospital cannot move from {from} to {to}")]
    InvalidTransition {
        from: HospitalStatus,
        to: HospitalStatus,
    },
}

impl ValidationError {
    /// Shorthand for a [`ValidationError::InvalidField`].
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`ValidationError::MissingRequiredField`].
    pub fn missing(field: &str) -> Self {
        ValidationError::MissingRequiredField {
            field: field.to_string(),
        }
    }
}

/// Errors raised by uniqueness constraints.
#[derive(Error, Debug)]
pub enum ConflictError {
    /// A hospital with this email is already registered.
    #[error("hospital with email {email} already exists")]
    DuplicateHospitalEmail { email: String },

    /// The hospital admin email is already taken by another account.
    #[error("user with email {email} already exists")]
    DuplicateAdminEmail { email: String },

    /// A portal or owner account email is already taken.
    #[error("user with email {email} already exists")]
    DuplicateUserEmail { email: String },

    /// A freshly generated QR token collided with an existing one.
    #[error("QR token collision")]
    DuplicateQrToken,
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
