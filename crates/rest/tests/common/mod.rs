//! Common test utilities for REST API testing.
//!
//! - [`harness`] - Test server with a bootstrapped owner and temp upload dir
//! - [`fixtures`] - Request bodies
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod harness;
