//! SQLite backend implementation.
//!
//! Documents are stored as JSON next to the columns needed for lookups and
//! uniqueness. In-memory databases are useful for tests; file databases run
//! in WAL mode.
//!
//! # Example
//!
//! ```no_run
//! use medqr_persistence::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE hospitals (
//!     id TEXT PRIMARY KEY,
//!     email TEXT NOT NULL UNIQUE,
//!     status TEXT NOT NULL,
//!     admin_user_id TEXT,
//!     data TEXT NOT NULL,      -- JSON document
//!     created_at TEXT NOT NULL
//! );
//!
//! CREATE TABLE users (
//!     id TEXT PRIMARY KEY,
//!     email TEXT NOT NULL UNIQUE,
//!     role TEXT NOT NULL,
//!     hospital_id TEXT REFERENCES hospitals(id),
//!     patient_id TEXT REFERENCES patients(id),
//!     data TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//!
//! CREATE TABLE patients (
//!     id TEXT PRIMARY KEY,
//!     hospital_id TEXT NOT NULL REFERENCES hospitals(id),
//!     qr_token TEXT NOT NULL UNIQUE,
//!     data TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//! ```

mod backend;
mod hospitals;
mod patients;
mod schema;
mod users;

pub use backend::{SqliteBackend, SqliteBackendConfig};

use rusqlite::ErrorCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BackendError, StorageError};

pub(crate) const BACKEND_NAME: &str = "sqlite";

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: BACKEND_NAME.to_string(),
        message,
        source: None,
    })
}

fn serialization_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::SerializationError { message })
}

fn encode<T: Serialize>(document: &T) -> Result<String, StorageError> {
    serde_json::to_string(document)
        .map_err(|e| serialization_error(format!("Failed to serialize document: {}", e)))
}

fn decode<T: DeserializeOwned>(data: &str) -> Result<T, StorageError> {
    serde_json::from_str(data)
        .map_err(|e| serialization_error(format!("Failed to deserialize document: {}", e)))
}

/// Returns `true` if `err` is a UNIQUE violation on `table.column`.
fn is_unique_violation(err: &rusqlite::Error, column: &str) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => {
            failure.code == ErrorCode::ConstraintViolation && message.contains(column)
        }
        _ => false,
    }
}
