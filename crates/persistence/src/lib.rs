//! MedQR Persistence Layer
//!
//! Storage, access model, and hospital lifecycle for the MedQR emergency
//! health server. Hospitals register themselves, the system owner approves
//! them, hospital staff manage patient records, and each record can be
//! resolved anonymously through an unguessable QR token.
//!
//! # Architecture
//!
//! - [`tenant`] - Principals, roles, and patient scopes
//! - [`types`] - Users, hospitals, patients, and their validation
//! - [`error`] - Error types for all operations
//! - [`core`] - Storage traits
//! - [`backends`] - Backend implementations (SQLite)
//!
//! # Access Model
//!
//! Every scoped storage operation takes a [`Principal`](tenant::Principal).
//! Patient operations ask the principal for a
//! [`PatientScope`](tenant::PatientScope) and apply it as a query filter:
//!
//! ```
//! use medqr_persistence::tenant::{
//!     HospitalId, Operation, PatientScope, Principal, UserId,
//! };
//!
//! let owner = Principal::SuperAdmin { user_id: UserId::new("owner") };
//! assert_eq!(owner.authorize(Operation::List).unwrap(), PatientScope::All);
//!
//! let admin = Principal::HospitalAdmin {
//!     user_id: UserId::new("u-1"),
//!     hospital_id: HospitalId::new("h-1"),
//! };
//! assert_eq!(
//!     admin.authorize(Operation::Update).unwrap(),
//!     PatientScope::Hospital(HospitalId::new("h-1"))
//! );
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use medqr_persistence::backends::sqlite::SqliteBackend;
//! use medqr_persistence::core::PatientStorage;
//! use medqr_persistence::types::QrToken;
//!
//! let backend = SqliteBackend::open("medqr.db")?;
//! backend.init_schema()?;
//!
//! // Anonymous QR resolution needs no principal.
//! let view = backend.resolve_qr_token(&QrToken::new("scanned-token")).await?;
//! println!("{}: {:?}", view.full_name, view.blood_group);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod tenant;
pub mod types;
