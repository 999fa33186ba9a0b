//! The authenticated principal.
//!
//! A [`Principal`] is required for every scoped storage operation. It is
//! built once per request from verified session claims and passed down
//! explicitly; the storage layer never consults ambient request state.

use serde::{Deserialize, Serialize};

use super::id::{HospitalId, PatientId, UserId};
use super::permissions::{Operation, Role};
use super::scope::PatientScope;
use crate::error::AccessError;

/// The identity making a request.
///
/// Each variant carries exactly the references its role needs, so a hospital
/// admin without a hospital cannot be represented.
///
/// # Examples
///
/// ```
/// use medqr_persistence::tenant::{HospitalId, Operation, PatientScope, Principal, UserId};
///
/// let admin = Principal::HospitalAdmin {
///     user_id: UserId::new("u-1"),
///     hospital_id: HospitalId::new("h-1"),
/// };
///
/// let scope = admin.authorize(Operation::Read).unwrap();
/// assert_eq!(scope, PatientScope::Hospital(HospitalId::new("h-1")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum Principal {
    /// The system owner.
    SuperAdmin {
        /// Account id.
        user_id: UserId,
    },
    /// A hospital staff account.
    HospitalAdmin {
        /// Account id.
        user_id: UserId,
        /// The hospital this account administers.
        hospital_id: HospitalId,
    },
    /// A patient portal account.
    Patient {
        /// Account id.
        user_id: UserId,
        /// The hospital holding the patient's record.
        hospital_id: HospitalId,
        /// The patient's own record.
        patient_id: PatientId,
    },
}

impl Principal {
    /// Returns the account id.
    pub fn user_id(&self) -> &UserId {
        match self {
            Principal::SuperAdmin { user_id }
            | Principal::HospitalAdmin { user_id, .. }
            | Principal::Patient { user_id, .. } => user_id,
        }
    }

    /// Returns the role of this principal.
    pub fn role(&self) -> Role {
        match self {
            Principal::SuperAdmin { .. } => Role::SuperAdmin,
            Principal::HospitalAdmin { .. } => Role::HospitalAdmin,
            Principal::Patient { .. } => Role::Patient,
        }
    }

    /// Returns the tenant this principal is bound to, if any.
    pub fn hospital_id(&self) -> Option<&HospitalId> {
        match self {
            Principal::SuperAdmin { .. } => None,
            Principal::HospitalAdmin { hospital_id, .. }
            | Principal::Patient { hospital_id, .. } => Some(hospital_id),
        }
    }

    /// Returns the patient record this principal owns, if any.
    pub fn patient_id(&self) -> Option<&PatientId> {
        match self {
            Principal::Patient { patient_id, .. } => Some(patient_id),
            _ => None,
        }
    }

    /// Fails with [`AccessError::RoleRequired`] unless this principal holds `role`.
    pub fn require_role(&self, role: Role) -> Result<(), AccessError> {
        if self.role() == role {
            Ok(())
        } else {
            Err(AccessError::RoleRequired {
                required: role,
                actual: self.role(),
            })
        }
    }

    /// Decides whether this principal may perform `operation` on patient
    /// records, and if so, which records the operation may touch.
    ///
    /// - The owner sees every tenant.
    /// - A hospital admin is confined to its own hospital.
    /// - A patient may only read its own record.
    pub fn authorize(&self, operation: Operation) -> Result<PatientScope, AccessError> {
        match self {
            Principal::SuperAdmin { .. } => Ok(PatientScope::All),
            Principal::HospitalAdmin { hospital_id, .. } => {
                Ok(PatientScope::Hospital(hospital_id.clone()))
            }
            Principal::Patient { patient_id, .. } => {
                if operation.is_read_only() {
                    Ok(PatientScope::Own(patient_id.clone()))
                } else {
                    Err(AccessError::Forbidden {
                        role: Role::Patient,
                        operation,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Principal {
        Principal::SuperAdmin {
            user_id: UserId::new("owner"),
        }
    }

    fn admin(hospital: &str) -> Principal {
        Principal::HospitalAdmin {
            user_id: UserId::new("admin"),
            hospital_id: HospitalId::new(hospital),
        }
    }

    fn patient(id: &str) -> Principal {
        Principal::Patient {
            user_id: UserId::new("portal"),
            hospital_id: HospitalId::new("h-1"),
            patient_id: PatientId::new(id),
        }
    }

    #[test]
    fn test_owner_sees_all() {
        for op in [
            Operation::Create,
            Operation::Read,
            Operation::List,
            Operation::Update,
            Operation::Delete,
        ] {
            assert_eq!(owner().authorize(op).unwrap(), PatientScope::All);
        }
    }

    #[test]
    fn test_hospital_admin_confined_to_hospital() {
        let scope = admin("h-1").authorize(Operation::Delete).unwrap();
        assert_eq!(scope, PatientScope::Hospital(HospitalId::new("h-1")));
    }

    #[test]
    fn test_patient_reads_own_record_only() {
        let scope = patient("p-1").authorize(Operation::List).unwrap();
        assert_eq!(scope, PatientScope::Own(PatientId::new("p-1")));

        let err = patient("p-1").authorize(Operation::Update).unwrap_err();
        assert!(matches!(
            err,
            AccessError::Forbidden {
                role: Role::Patient,
                operation: Operation::Update
            }
        ));
    }

    #[test]
    fn test_require_role() {
        assert!(owner().require_role(Role::SuperAdmin).is_ok());
        let err = admin("h-1").require_role(Role::SuperAdmin).unwrap_err();
        assert!(matches!(
            err,
            AccessError::RoleRequired {
                required: Role::SuperAdmin,
                actual: Role::HospitalAdmin
            }
        ));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(owner().hospital_id(), None);
        assert_eq!(admin("h-2").hospital_id(), Some(&HospitalId::new("h-2")));
        assert_eq!(patient("p-3").patient_id(), Some(&PatientId::new("p-3")));
        assert_eq!(patient("p-3").role(), Role::Patient);
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(admin("h-1")).unwrap();
        assert_eq!(json["role"], "HOSPITAL_ADMIN");
        assert_eq!(json["hospitalId"], "h-1");
        assert_eq!(json["userId"], "admin");
    }
}
