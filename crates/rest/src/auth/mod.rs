//! Authentication for the MedQR REST API.
//!
//! This module provides the pieces behind login and session handling:
//!
//! - [`jwt`] - Signed session tokens carrying the caller's principal
//! - [`password`] - Argon2id password hashing
//! - [`credentials`] - Email and password checks used by the login routes
//!
//! Session tokens are stateless. A token stays valid until it expires, even
//! if the hospital is rejected afterwards; the account flag is checked again
//! at the next login.

pub mod credentials;
pub mod jwt;
pub mod password;

pub use credentials::{LoginAudience, authenticate};
pub use jwt::{Claims, TokenIssuer};
pub use password::{generate_password, hash_password, validate_password_strength, verify_password};

/// Minimum length of an account password.
pub const MIN_PASSWORD_LEN: usize = 6;
