//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation;
use crate::error::ValidationError;
use crate::tenant::{HospitalId, PatientId, Principal, Role, UserId};

/// A stored account.
///
/// The password is held only as a PHC-format hash. Use [`User::profile`]
/// for anything that leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, unique across all accounts, stored lowercase.
    pub email: String,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Hospital reference (hospital admins and patient portal accounts).
    pub hospital: Option<HospitalId>,
    /// Patient reference (patient portal accounts).
    pub patient: Option<PatientId>,
    /// Whether the account may log in. Hospital admins start inactive.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds the principal this account acts as once authenticated.
    ///
    /// Returns `None` when the stored references do not match the role, which
    /// only happens for corrupt records.
    pub fn principal(&self) -> Option<Principal> {
        match self.role {
            Role::SuperAdmin => Some(Principal::SuperAdmin {
                user_id: self.id.clone(),
            }),
            Role::HospitalAdmin => Some(Principal::HospitalAdmin {
                user_id: self.id.clone(),
                hospital_id: self.hospital.clone()?,
            }),
            Role::Patient => Some(Principal::Patient {
                user_id: self.id.clone(),
                hospital_id: self.hospital.clone()?,
                patient_id: self.patient.clone()?,
            }),
        }
    }

    /// Returns the public view of this account.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            hospital: self.hospital.clone(),
            patient: self.patient.clone(),
            is_active: self.is_active,
        }
    }
}

/// An account without its credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Hospital reference.
    pub hospital: Option<HospitalId>,
    /// Patient reference.
    pub patient: Option<PatientId>,
    /// Whether the account may log in.
    pub is_active: bool,
}

/// Input for creating an account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// PHC-format password hash.
    pub password_hash: String,
}

impl NewUser {
    /// Validates and normalizes name and email.
    pub fn validated(self, email_field: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validation::required("name", &self.name)?,
            email: validation::email(email_field, &self.email)?,
            password_hash: self.password_hash,
        })
    }

    /// Materializes a stored account with a fresh id.
    pub(crate) fn into_user(
        self,
        role: Role,
        hospital: Option<HospitalId>,
        patient: Option<PatientId>,
        is_active: bool,
    ) -> User {
        User {
            id: UserId::generate(),
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            hospital,
            patient,
            is_active,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            name: " Ada ".to_string(),
            email: "ADA@Example.org".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[test]
    fn test_validated_normalizes() {
        let user = new_user().validated("email").unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.org");
    }

    #[test]
    fn test_profile_has_no_hash() {
        let user = new_user()
            .validated("email")
            .unwrap()
            .into_user(Role::SuperAdmin, None, None, true);
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "SUPER_ADMIN");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_principal_requires_matching_references() {
        let mut user = new_user()
            .validated("email")
            .unwrap()
            .into_user(Role::HospitalAdmin, None, None, false);
        assert!(user.principal().is_none());

        user.hospital = Some(HospitalId::new("h-1"));
        assert_eq!(
            user.principal().unwrap().hospital_id(),
            Some(&HospitalId::new("h-1"))
        );
    }
}
