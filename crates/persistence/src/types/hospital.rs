//! Hospitals and their approval lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{NewUser, UserProfile};
use super::validation;
use crate::error::ValidationError;
use crate::tenant::HospitalId;

/// Approval state of a hospital.
///
/// New hospitals start [`HospitalStatus::Pending`]. The owner moves them to
/// approved or rejected, and may later flip between those two. Nothing ever
/// moves back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HospitalStatus {
    /// Awaiting review.
    Pending,
    /// Active; the admin may log in.
    Approved,
    /// Refused or suspended; the admin is locked out.
    Rejected,
}

/// Outcome of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status moved.
    Changed {
        /// Previous status.
        from: HospitalStatus,
        /// New status.
        to: HospitalStatus,
    },
    /// The hospital was already in the target status.
    Unchanged,
}

impl HospitalStatus {
    /// Returns the wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            HospitalStatus::Pending => "PENDING",
            HospitalStatus::Approved => "APPROVED",
            HospitalStatus::Rejected => "REJECTED",
        }
    }

    /// Checks a move from `self` to `target`.
    ///
    /// Re-applying the current status is accepted as a no-op.
    pub fn transition_to(self, target: HospitalStatus) -> Result<Transition, ValidationError> {
        if self == target {
            return Ok(Transition::Unchanged);
        }
        match target {
            HospitalStatus::Pending => Err(ValidationError::InvalidTransition {
                from: self,
                to: target,
            }),
            HospitalStatus::Approved | HospitalStatus::Rejected => Ok(Transition::Changed {
                from: self,
                to: target,
            }),
        }
    }

    /// Whether the hospital's admin account is active in this status.
    pub fn admin_active(&self) -> bool {
        matches!(self, HospitalStatus::Approved)
    }
}

impl fmt::Display for HospitalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HospitalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(HospitalStatus::Pending),
            "APPROVED" => Ok(HospitalStatus::Approved),
            "REJECTED" => Ok(HospitalStatus::Rejected),
            _ => Err(ValidationError::invalid(
                "status",
                format!("unknown hospital status '{s}'"),
            )),
        }
    }
}

/// A tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    /// Hospital id.
    pub id: HospitalId,
    /// Hospital name.
    pub name: String,
    /// Contact email, unique across hospitals.
    pub email: String,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Name of the primary contact person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_contact_name: Option<String>,
    /// Approval state.
    pub status: HospitalStatus,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// A hospital together with its admin account, as listed for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalOverview {
    /// The hospital.
    #[serde(flatten)]
    pub hospital: Hospital,
    /// Its admin account, if one exists.
    pub admin_user: Option<UserProfile>,
}

/// Hospital details submitted at registration.
#[derive(Debug, Clone)]
pub struct NewHospital {
    /// Hospital name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Primary contact person.
    pub primary_contact_name: Option<String>,
}

/// A complete self-registration: the hospital plus its admin account.
#[derive(Debug, Clone)]
pub struct HospitalRegistration {
    /// Hospital details.
    pub hospital: NewHospital,
    /// Admin account, with the password already hashed.
    pub admin: NewUser,
}

impl HospitalRegistration {
    /// Validates and normalizes every field.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let hospital = NewHospital {
            name: validation::required("name", &self.hospital.name)?,
            email: validation::email("email", &self.hospital.email)?,
            phone: validation::optional(self.hospital.phone.as_deref())
                .map(|phone| validation::phone("phone", &phone))
                .transpose()?,
            address: validation::optional(self.hospital.address.as_deref()),
            primary_contact_name: validation::optional(
                self.hospital.primary_contact_name.as_deref(),
            ),
        };
        let admin = NewUser {
            name: validation::required("adminName", &self.admin.name)?,
            email: validation::email("adminEmail", &self.admin.email)?,
            password_hash: self.admin.password_hash,
        };
        Ok(Self { hospital, admin })
    }
}

impl NewHospital {
    /// Materializes a pending hospital with a fresh id.
    pub(crate) fn into_hospital(self) -> Hospital {
        let now = Utc::now();
        Hospital {
            id: HospitalId::generate(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            primary_contact_name: self.primary_contact_name,
            status: HospitalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
