//! Core storage traits.
//!
//! - [`StorageBackend`] - Backend name and health
//! - [`UserStorage`] - Account lookups and owner bootstrap
//! - [`HospitalStorage`] - Registration and approval
//! - [`PatientStorage`] - Scoped patient records and QR resolution
//! - [`Storage`] - All of the above, implemented automatically
//!
//! # Trait Hierarchy
//!
//! ```text
//! StorageBackend
//!     ├── UserStorage
//!     ├── HospitalStorage
//!     └── PatientStorage
//!             └── Storage (blanket)
//! ```

mod storage;

pub use storage::{
    HospitalStorage, PatientQuery, PatientStorage, Storage, StorageBackend, UserStorage,
};
