//! Middleware for the MedQR REST API.
//!
//! - [`auth`] - Verifies the session token and attaches the caller's principal
//! - [`request_id`] - Tags every request and response with `x-request-id`

pub mod auth;
pub mod request_id;

pub use auth::{bearer_token, require_auth};
pub use request_id::X_REQUEST_ID;
