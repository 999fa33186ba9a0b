//! Document types stored by the persistence layer.
//!
//! - [`User`] - Accounts, with [`UserProfile`] as the credential-free view
//! - [`Hospital`] - Tenants and their [`HospitalStatus`] lifecycle
//! - [`Patient`] - Records, the [`QrToken`] that publishes them, and the
//!   [`PatientEmergencyView`] shown to anonymous scanners
//!
//! Input types ([`NewUser`], [`HospitalRegistration`], [`PatientDraft`]) are
//! validated and normalized before they reach a backend.
//!
//! # Examples
//!
//! ```
//! use medqr_persistence::types::{PatientDraft, RiskLevel};
//! use serde_json::json;
//!
//! let draft: PatientDraft = serde_json::from_value(json!({
//!     "fullName": "Jane Roe",
//!     "age": 40,
//!     "gender": "Female",
//!     "bloodGroup": "O-",
//!     "emergencyContact": {"name": "Bob", "phone": "+1 555 0100"}
//! }))
//! .unwrap();
//!
//! let profile = draft.validate().unwrap();
//! assert_eq!(profile.risk_level, RiskLevel::Low);
//! ```

mod hospital;
mod patient;
mod user;
pub mod validation;

pub use hospital::{
    Hospital, HospitalOverview, HospitalRegistration, HospitalStatus, NewHospital, Transition,
};
pub use patient::{
    BloodGroup, EmergencyContact, EmergencyContactDraft, Gender, MAX_AGE, MedicalProfile,
    Patient, PatientDraft, PatientEmergencyView, QrToken, RiskLevel, UPLOADS_PATH,
};
pub use user::{NewUser, User, UserProfile};
