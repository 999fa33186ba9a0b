//! Axum extractors for the MedQR REST API.
//!
//! - [`Authenticated`] - The caller's principal, placed by the auth middleware
//! - [`SuperAdmin`] - Same, but only for the system owner
//! - [`JsonBody`] - A JSON body whose rejections use the API error format

pub mod json;
pub mod principal;

pub use json::JsonBody;
pub use principal::{Authenticated, SuperAdmin};
