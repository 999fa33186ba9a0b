//! Storage traits.
//!
//! The traits are split by document kind. Every operation that reads or
//! writes tenant data takes a [`Principal`]; the only exceptions are account
//! lookups used during login, hospital self-registration, and QR token
//! resolution, which by their nature happen before anyone is authenticated.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::tenant::{HospitalId, PatientId, Principal, UserId};
use crate::types::{
    HospitalOverview, HospitalRegistration, HospitalStatus, NewUser, Patient, PatientDraft,
    PatientEmergencyView, QrToken, User,
};

/// Connection-level operations shared by every backend.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Checks that the backend can serve queries.
    async fn ping(&self) -> StorageResult<()>;
}

/// Account lookups and owner bootstrap.
#[async_trait]
pub trait UserStorage: StorageBackend {
    /// Finds an account by its (normalized) email.
    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Finds an account by id.
    async fn find_user(&self, id: &UserId) -> StorageResult<Option<User>>;

    /// Creates the owner account unless one already exists.
    ///
    /// Returns the new account, or `None` when an owner was already present.
    async fn ensure_super_admin(&self, owner: NewUser) -> StorageResult<Option<User>>;
}

/// Hospital registration and the approval workflow.
#[async_trait]
pub trait HospitalStorage: StorageBackend {
    /// Registers a hospital and its admin account atomically.
    ///
    /// The hospital starts pending and the admin inactive.
    ///
    /// # Errors
    ///
    /// * `ConflictError::DuplicateHospitalEmail` - a hospital already uses the email
    /// * `ConflictError::DuplicateAdminEmail` - an account already uses the admin email
    async fn register_hospital(
        &self,
        registration: HospitalRegistration,
    ) -> StorageResult<HospitalOverview>;

    /// Lists hospitals, newest first, optionally filtered by status.
    async fn list_hospitals(
        &self,
        principal: &Principal,
        status: Option<HospitalStatus>,
    ) -> StorageResult<Vec<HospitalOverview>>;

    /// Reads one hospital with its admin account.
    async fn get_hospital(
        &self,
        principal: &Principal,
        id: &HospitalId,
    ) -> StorageResult<HospitalOverview>;

    /// Moves a hospital to `status` and sets its admin's `isActive` to match.
    ///
    /// Both writes happen in one transaction. Re-applying the current status
    /// succeeds without changes.
    ///
    /// # Errors
    ///
    /// * `ValidationError::InvalidTransition` - the target is `PENDING`
    async fn set_hospital_status(
        &self,
        principal: &Principal,
        id: &HospitalId,
        status: HospitalStatus,
    ) -> StorageResult<HospitalOverview>;
}

/// Filters for listing patients, applied inside the caller's scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientQuery {
    /// Only records of this hospital.
    pub hospital: Option<HospitalId>,
}

impl PatientQuery {
    /// Restricts the listing to one hospital.
    pub fn in_hospital(hospital: HospitalId) -> Self {
        Self {
            hospital: Some(hospital),
        }
    }
}

/// Tenant-scoped patient records.
///
/// A record outside the caller's scope is reported as not found.
#[async_trait]
pub trait PatientStorage: StorageBackend {
    /// Creates a record, optionally together with a patient portal account.
    ///
    /// The hospital is taken from the principal for hospital admins. The owner
    /// must name an existing hospital in the draft.
    async fn create_patient(
        &self,
        principal: &Principal,
        draft: PatientDraft,
        portal: Option<NewUser>,
    ) -> StorageResult<Patient>;

    /// Lists the records visible to the principal, newest first.
    async fn list_patients(
        &self,
        principal: &Principal,
        query: &PatientQuery,
    ) -> StorageResult<Vec<Patient>>;

    /// Reads one record.
    async fn get_patient(&self, principal: &Principal, id: &PatientId) -> StorageResult<Patient>;

    /// Applies a partial update. Identity fields are never changed.
    async fn update_patient(
        &self,
        principal: &Principal,
        id: &PatientId,
        patch: PatientDraft,
    ) -> StorageResult<Patient>;

    /// Deletes a record and its portal account, returning the removed record.
    async fn delete_patient(&self, principal: &Principal, id: &PatientId)
    -> StorageResult<Patient>;

    /// Resolves a QR token to its public projection. No principal is involved.
    ///
    /// # Errors
    ///
    /// * `ResourceError::TokenNotFound` - no record carries the token
    async fn resolve_qr_token(&self, token: &QrToken) -> StorageResult<PatientEmergencyView>;
}

/// Everything the HTTP layer needs from a backend.
pub trait Storage: UserStorage + HospitalStorage + PatientStorage {}

impl<T> Storage for T where T: UserStorage + HospitalStorage + PatientStorage {}
