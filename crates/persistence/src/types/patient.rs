//! Patient records, QR tokens, and the public emergency projection.

// Field names mirror the JSON wire format.
#![allow(missing_docs)]

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use super::validation;
use crate::error::ValidationError;
use crate::tenant::{HospitalId, PatientId};

/// Oldest accepted age.
pub const MAX_AGE: i64 = 150;

/// Random bytes behind every QR token.
const QR_TOKEN_BYTES: usize = 32;

/// Path prefix under which QR images are served.
pub const UPLOADS_PATH: &str = "/uploads";

/// Patient gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

/// Triage risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Person to call in an emergency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// The public lookup key of a patient.
///
/// Generated once from the operating system's CSPRNG and never reassigned.
/// The encoded form only uses `[A-Za-z0-9_-]`, so it is safe inside URLs and
/// file names.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QrToken(String);

impl QrToken {
    /// Draws a fresh token.
    pub fn generate() -> Self {
        let mut bytes = [0u8; QR_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wraps an existing token, e.g. one read from a URL.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the rendered QR image.
    pub fn image_file_name(&self) -> String {
        format!("qr-{}.png", self.0)
    }

    /// Public path of the rendered QR image.
    pub fn image_path(&self) -> String {
        format!("{}/{}", UPLOADS_PATH, self.image_file_name())
    }
}

// Tokens are bearer secrets; keep them out of debug output.
impl fmt::Debug for QrToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "QrToken({prefix}..)")
    }
}

impl fmt::Display for QrToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated medical data of a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalProfile {
    pub full_name: String,
    pub age: u8,
    pub gender: Gender,
    #[serde(default)]
    pub photo_url: String,
    pub blood_group: BloodGroup,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medical_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    pub emergency_contact: EmergencyContact,
    #[serde(default)]
    pub risk_level: RiskLevel,
    /// Free text written by an external summarizer. Staff only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}

/// A stored patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    #[serde(flatten)]
    pub profile: MedicalProfile,
    /// Owning hospital. Fixed at creation.
    pub hospital: HospitalId,
    /// Public lookup key. Fixed at creation.
    pub qr_token: QrToken,
    /// Public path of the QR image.
    pub qr_code_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Builds a new record with a fresh id and QR token.
    pub(crate) fn new(profile: MedicalProfile, hospital: HospitalId) -> Self {
        let now = Utc::now();
        let qr_token = QrToken::generate();
        Self {
            id: PatientId::generate(),
            profile,
            hospital,
            qr_code_url: qr_token.image_path(),
            qr_token,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `patch` and re-validates the result.
    ///
    /// Identity fields (`id`, `hospital`, `qrToken`, `qrCodeUrl`) are never
    /// taken from the patch.
    pub fn patched(&self, patch: PatientDraft) -> Result<Patient, ValidationError> {
        let profile = PatientDraft::from(&self.profile).merge(patch).validate()?;
        Ok(Patient {
            profile,
            updated_at: Utc::now(),
            ..self.clone()
        })
    }
}

/// Emergency contact as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContactDraft {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Patient fields as submitted by staff.
///
/// Used both for creation, where required fields must be present, and as a
/// partial update, where absent fields keep their stored values. Fields that
/// identify the record are not part of this type, so a client cannot change
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDraft {
    pub full_name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub photo_url: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub allergies: Option<Vec<String>>,
    pub medical_conditions: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
    pub emergency_contact: Option<EmergencyContactDraft>,
    pub risk_level: Option<RiskLevel>,
    pub ai_summary: Option<String>,
    /// Target hospital. Only honored for the owner on creation.
    pub hospital: Option<HospitalId>,
}

impl PatientDraft {
    /// Overlays every field present in `patch`, except `hospital`.
    pub fn merge(self, patch: PatientDraft) -> PatientDraft {
        PatientDraft {
            full_name: patch.full_name.or(self.full_name),
            age: patch.age.or(self.age),
            gender: patch.gender.or(self.gender),
            photo_url: patch.photo_url.or(self.photo_url),
            blood_group: patch.blood_group.or(self.blood_group),
            allergies: patch.allergies.or(self.allergies),
            medical_conditions: patch.medical_conditions.or(self.medical_conditions),
            medications: patch.medications.or(self.medications),
            emergency_contact: patch.emergency_contact.or(self.emergency_contact),
            risk_level: patch.risk_level.or(self.risk_level),
            ai_summary: patch.ai_summary.or(self.ai_summary),
            hospital: self.hospital,
        }
    }

    /// Checks required fields and ranges, producing a normalized profile.
    pub fn validate(self) -> Result<MedicalProfile, ValidationError> {
        let full_name = validation::required("fullName", self.full_name.as_deref().unwrap_or(""))?;

        let age = self.age.ok_or_else(|| ValidationError::missing("age"))?;
        if !(0..=MAX_AGE).contains(&age) {
            return Err(ValidationError::invalid(
                "age",
                format!("must be between 0 and {MAX_AGE}"),
            ));
        }
        let age = u8::try_from(age)
            .map_err(|_| ValidationError::invalid("age", "out of range"))?;

        let gender = self.gender.ok_or_else(|| ValidationError::missing("gender"))?;
        let blood_group = self
            .blood_group
            .ok_or_else(|| ValidationError::missing("bloodGroup"))?;

        let contact = self
            .emergency_contact
            .ok_or_else(|| ValidationError::missing("emergencyContact"))?;
        let emergency_contact = EmergencyContact {
            name: validation::required(
                "emergencyContact.name",
                contact.name.as_deref().unwrap_or(""),
            )?,
            phone: validation::phone(
                "emergencyContact.phone",
                contact.phone.as_deref().unwrap_or(""),
            )?,
        };

        Ok(MedicalProfile {
            full_name,
            age,
            gender,
            photo_url: self.photo_url.map(|p| p.trim().to_string()).unwrap_or_default(),
            blood_group,
            allergies: validation::string_list(self.allergies.unwrap_or_default()),
            medical_conditions: validation::string_list(
                self.medical_conditions.unwrap_or_default(),
            ),
            medications: validation::string_list(self.medications.unwrap_or_default()),
            emergency_contact,
            risk_level: self.risk_level.unwrap_or_default(),
            ai_summary: validation::optional(self.ai_summary.as_deref()),
        })
    }
}

impl From<&MedicalProfile> for PatientDraft {
    fn from(profile: &MedicalProfile) -> Self {
        PatientDraft {
            full_name: Some(profile.full_name.clone()),
            age: Some(i64::from(profile.age)),
            gender: Some(profile.gender),
            photo_url: Some(profile.photo_url.clone()),
            blood_group: Some(profile.blood_group),
            allergies: Some(profile.allergies.clone()),
            medical_conditions: Some(profile.medical_conditions.clone()),
            medications: Some(profile.medications.clone()),
            emergency_contact: Some(EmergencyContactDraft {
                name: Some(profile.emergency_contact.name.clone()),
                phone: Some(profile.emergency_contact.phone.clone()),
            }),
            risk_level: Some(profile.risk_level),
            ai_summary: profile.ai_summary.clone(),
            hospital: None,
        }
    }
}

/// What an anonymous QR scan may see.
///
/// Fields are listed one by one. A field added to [`Patient`] stays private
/// until it is added here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientEmergencyView {
    pub full_name: String,
    pub age: u8,
    pub gender: Gender,
    pub photo_url: String,
    pub blood_group: BloodGroup,
    pub allergies: Vec<String>,
    pub medical_conditions: Vec<String>,
    pub medications: Vec<String>,
    pub emergency_contact: EmergencyContact,
    pub risk_level: RiskLevel,
}

impl From<&Patient> for PatientEmergencyView {
    fn from(patient: &Patient) -> Self {
        let p = &patient.profile;
        PatientEmergencyView {
            full_name: p.full_name.clone(),
            age: p.age,
            gender: p.gender,
            photo_url: p.photo_url.clone(),
            blood_group: p.blood_group,
            allergies: p.allergies.clone(),
            medical_conditions: p.medical_conditions.clone(),
            medications: p.medications.clone(),
            emergency_contact: p.emergency_contact.clone(),
            risk_level: p.risk_level,
        }
    }
}
