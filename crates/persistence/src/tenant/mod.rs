//! Principals, roles, and tenant scoping.
//!
//! This module provides the access model of the persistence layer. Every
//! scoped storage operation requires a [`Principal`], and every patient
//! operation narrows its query through the [`PatientScope`] that
//! [`Principal::authorize`] returns.
//!
//! # Core Types
//!
//! - [`HospitalId`] - Tenant identifier
//! - [`Principal`] - The authenticated caller, one variant per [`Role`]
//! - [`Operation`] - What the caller attempts on patient records
//! - [`PatientScope`] - Which records that operation may touch
//!
//! # Design
//!
//! Roles form a closed enum. Adding a role forces every `match` on
//! [`Principal`] to handle it, so no operation can silently fall through to
//! global visibility.
//!
//! Records outside a caller's scope are reported as not found rather than
//! forbidden, so callers cannot probe for another tenant's records.
//!
//! # Examples
//!
//! ```
//! use medqr_persistence::tenant::{
//!     HospitalId, Operation, PatientId, PatientScope, Principal, UserId,
//! };
//!
//! let portal = Principal::Patient {
//!     user_id: UserId::new("u-7"),
//!     hospital_id: HospitalId::new("h-1"),
//!     patient_id: PatientId::new("p-7"),
//! };
//!
//! assert_eq!(
//!     portal.authorize(Operation::Read).unwrap(),
//!     PatientScope::Own(PatientId::new("p-7"))
//! );
//! assert!(portal.authorize(Operation::Delete).is_err());
//! ```

mod id;
mod permissions;
mod principal;
mod scope;

pub use id::{HospitalId, PatientId, UserId};
pub use permissions::{Operation, Role};
pub use principal::Principal;
pub use scope::PatientScope;
