//! Query scopes for patient records.
//!
//! A [`PatientScope`] is the query restriction a principal's role imposes.
//! Backends translate it into a filter on every list, read, update and
//! delete, so a record outside the scope is simply not found.

use super::id::{HospitalId, PatientId};
use crate::error::{AccessError, StorageResult, ValidationError};

/// Which patient records an operation may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientScope {
    /// Every record in every hospital.
    All,
    /// Records belonging to one hospital.
    Hospital(HospitalId),
    /// A single record.
    Own(PatientId),
}

impl PatientScope {
    /// Determines the hospital a new record is filed under.
    ///
    /// A hospital-scoped caller always files under its own hospital and the
    /// requested value is ignored. An unscoped caller must name one.
    pub fn hospital_for_create(&self, requested: Option<HospitalId>) -> StorageResult<HospitalId> {
        match self {
            PatientScope::Hospital(hospital_id) => Ok(hospital_id.clone()),
            PatientScope::All => requested
                .filter(|h| !h.as_str().trim().is_empty())
                .ok_or_else(|| ValidationError::missing("hospital").into()),
            PatientScope::Own(_) => Err(AccessError::MissingTenant.into()),
        }
    }
}
