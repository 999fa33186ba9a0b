//! HTTP request handlers.
//!
//! - [`auth`] - Login, patient login and the current account
//! - [`hospitals`] - Registration and owner approval
//! - [`patients`] - Tenant-scoped patient records
//! - [`public`] - Anonymous QR token lookup
//! - [`health`] - Health check endpoints

pub mod auth;
pub mod health;
pub mod hospitals;
pub mod patients;
pub mod public;

pub use health::{health_handler, liveness_handler, readiness_handler};
