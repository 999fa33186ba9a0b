//! Error types for the MedQR REST API.
//!
//! Every error leaves the server as a JSON body with a stable kind:
//!
//! ```json
//! {"success": false, "error": "NotFound", "message": "Patient not found"}
//! ```
//!
//! # Error Mapping
//!
//! | Kind | HTTP Status | Raised by |
//! |------|-------------|-----------|
//! | InvalidCredentials | 401 | Login with unknown email or wrong password |
//! | AccountPending | 403 | Login of an admin whose hospital is not approved |
//! | Unauthenticated | 401 | Missing, malformed, or expired session token |
//! | Forbidden | 403 | Wrong role for the operation |
//! | NotFound | 404 | Unknown record, or a record in another tenant |
//! | TokenNotFound | 404 | Unknown QR token |
//! | DuplicateHospitalEmail | 400 | Registration with a taken hospital email |
//! | DuplicateAdminEmail | 400 | Registration with a taken admin email |
//! | ValidationError | 400 | Missing or malformed fields |
//! | Conflict | 409 | Other uniqueness violations |
//! | InternalError | 500 | Backend and I/O failures |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medqr_persistence::error::{
    AccessError, BackendError, ConflictError, ResourceError, StorageError, ValidationError,
};
use std::fmt;

/// Message returned for every unknown QR token, whatever its shape.
pub const INVALID_QR_CODE: &str = "Invalid QR code";

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Unknown email or wrong password (HTTP 401).
    InvalidCredentials,

    /// Correct credentials, but the account is not active yet (HTTP 403).
    AccountPending,

    /// No valid session token (HTTP 401).
    Unauthenticated {
        /// Why the token was rejected.
        message: String,
    },

    /// The caller's role may not perform this operation (HTTP 403).
    Forbidden {
        /// Description of the denied operation.
        message: String,
    },

    /// Record not found or outside the caller's scope (HTTP 404).
    NotFound {
        /// The record type (e.g., "Patient").
        resource_type: String,
        /// The record ID.
        id: String,
    },

    /// Unknown QR token (HTTP 404).
    TokenNotFound,

    /// A hospital already uses this email (HTTP 400).
    DuplicateHospitalEmail {
        /// The rejected email.
        email: String,
    },

    /// An account already uses this admin email (HTTP 400).
    DuplicateAdminEmail {
        /// The rejected email.
        email: String,
    },

    /// Invalid request data (HTTP 400).
    ValidationError {
        /// Description of the problem.
        message: String,
    },

    /// Uniqueness violation (HTTP 409).
    Conflict {
        /// Description of the conflict.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message. Logged, not returned to the client.
        message: String,
    },
}

impl RestError {
    /// Returns the stable kind reported in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            RestError::InvalidCredentials => "InvalidCredentials",
            RestError::AccountPending => "AccountPending",
            RestError::Unauthenticated { .. } => "Unauthenticated",
            RestError::Forbidden { .. } => "Forbidden",
            RestError::NotFound { .. } => "NotFound",
            RestError::TokenNotFound => "TokenNotFound",
            RestError::DuplicateHospitalEmail { .. } => "DuplicateHospitalEmail",
            RestError::DuplicateAdminEmail { .. } => "DuplicateAdminEmail",
            RestError::ValidationError { .. } => "ValidationError",
            RestError::Conflict { .. } => "Conflict",
            RestError::InternalError { .. } => "InternalError",
        }
    }

    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::InvalidCredentials | RestError::Unauthenticated { .. } => {
                StatusCode::UNAUTHORIZED
            }
            RestError::AccountPending | RestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RestError::NotFound { .. } | RestError::TokenNotFound => StatusCode::NOT_FOUND,
            RestError::DuplicateHospitalEmail { .. }
            | RestError::DuplicateAdminEmail { .. }
            | RestError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            RestError::Conflict { .. } => StatusCode::CONFLICT,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shorthand for [`RestError::Unauthenticated`].
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        RestError::Unauthenticated {
            message: message.into(),
        }
    }

    /// Shorthand for [`RestError::ValidationError`].
    pub fn validation(message: impl Into<String>) -> Self {
        RestError::ValidationError {
            message: message.into(),
        }
    }

    /// Shorthand for [`RestError::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        RestError::InternalError {
            message: message.into(),
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::InvalidCredentials => write!(f, "Invalid email or password"),
            RestError::AccountPending => {
                write!(f, "Account is pending approval by the system owner")
            }
            RestError::Unauthenticated { message } => write!(f, "Not authorized: {}", message),
            RestError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            RestError::NotFound { resource_type, .. } => write!(f, "{} not found", resource_type),
            RestError::TokenNotFound => write!(f, "{}", INVALID_QR_CODE),
            RestError::DuplicateHospitalEmail { .. } => {
                write!(f, "Hospital with this email already exists")
            }
            RestError::DuplicateAdminEmail { .. } => {
                write!(f, "User with this email already exists")
            }
            RestError::ValidationError { message } => write!(f, "{}", message),
            RestError::Conflict { message } => write!(f, "Conflict: {}", message),
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let message = match &self {
            RestError::InternalError { message } => {
                tracing::error!(error = %message, "Request failed");
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": self.kind(),
            "message": message,
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => e.into(),
            StorageError::Access(e) => e.into(),
            StorageError::Validation(e) => e.into(),
            StorageError::Conflict(e) => e.into(),
            StorageError::Backend(e) => e.into(),
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::NotFound { resource_type, id } => {
                RestError::NotFound { resource_type, id }
            }
            ResourceError::TokenNotFound => RestError::TokenNotFound,
        }
    }
}

impl From<AccessError> for RestError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::MissingTenant => RestError::unauthenticated(err.to_string()),
            AccessError::Forbidden { .. } | AccessError::RoleRequired { .. } => {
                RestError::Forbidden {
                    message: err.to_string(),
                }
            }
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::validation(err.to_string())
    }
}

impl From<ConflictError> for RestError {
    fn from(err: ConflictError) -> Self {
        match err {
            ConflictError::DuplicateHospitalEmail { email } => {
                RestError::DuplicateHospitalEmail { email }
            }
            ConflictError::DuplicateAdminEmail { email } => RestError::DuplicateAdminEmail { email },
            ConflictError::DuplicateUserEmail { .. } => RestError::validation(err.to_string()),
            ConflictError::DuplicateQrToken => RestError::Conflict {
                message: err.to_string(),
            },
        }
    }
}

impl From<BackendError> for RestError {
    fn from(err: BackendError) -> Self {
        RestError::internal(err.to_string())
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;
    use medqr_persistence::tenant::{Operation, Role};

    #[test]
    fn test_token_not_found_message_is_fixed() {
        let err: RestError = StorageError::Resource(ResourceError::TokenNotFound).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), "TokenNotFound");
        assert_eq!(err.to_string(), "Invalid QR code");
    }

    #[test]
    fn test_not_found_mapping() {
        let err: RestError = StorageError::not_found("Patient", "p-1").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Patient not found");
    }

    #[test]
    fn test_access_mapping() {
        let err: RestError = AccessError::Forbidden {
            role: Role::Patient,
            operation: Operation::Delete,
        }
        .into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.kind(), "Forbidden");
    }

    #[test]
    fn test_duplicate_emails_are_bad_requests() {
        let err: RestError = ConflictError::DuplicateAdminEmail {
            email: "a@x.com".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "DuplicateAdminEmail");
    }

    #[test]
    fn test_validation_mapping() {
        let err: RestError = ValidationError::missing("fullName").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("fullName"));
    }

    #[test]
    fn test_login_errors() {
        assert_eq!(
            RestError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(RestError::AccountPending.status(), StatusCode::FORBIDDEN);
    }
}
