//! Hospital registration and approval handlers.
//!
//! Registration is public. Every other route requires the system owner.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medqr_persistence::core::{PatientQuery, Storage};
use medqr_persistence::error::ValidationError;
use medqr_persistence::tenant::HospitalId;
use medqr_persistence::types::{HospitalRegistration, HospitalStatus, NewHospital, NewUser};
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::password::{hash_password_blocking, validate_password_strength};
use crate::error::RestResult;
use crate::extractors::{JsonBody, SuperAdmin};
use crate::state::AppState;

/// Body of `POST /hospitals/register`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterHospitalRequest {
    /// Hospital name.
    #[serde(default)]
    pub name: String,
    /// Hospital contact email.
    #[serde(default)]
    pub email: String,
    /// Hospital phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Name of the primary contact.
    pub primary_contact_name: Option<String>,
    /// Name of the admin account.
    #[serde(default)]
    pub admin_name: String,
    /// Login email of the admin account.
    #[serde(default)]
    pub admin_email: String,
    /// Password of the admin account.
    #[serde(default)]
    pub admin_password: String,
}

/// Query parameters of `GET /hospitals`.
#[derive(Debug, Default, Deserialize)]
pub struct HospitalListParams {
    /// Status filter, case-insensitive.
    pub status: Option<String>,
}

impl HospitalListParams {
    fn status(&self) -> RestResult<Option<HospitalStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Ok(Some(s.parse::<HospitalStatus>()?)),
        }
    }
}

/// Handler for hospital self-registration.
///
/// Creates a `PENDING` hospital and an inactive admin account together.
///
/// # HTTP Request
///
/// `POST /hospitals/register`
///
/// # Response
///
/// - `201 Created` - `{success, message, hospital: {id, name, status}}`
/// - `400 Bad Request` - Validation failure or a taken email
pub async fn register_handler<S>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<RegisterHospitalRequest>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    if body.admin_password.is_empty() {
        return Err(ValidationError::missing("adminPassword").into());
    }
    validate_password_strength("adminPassword", &body.admin_password)?;
    let password_hash = hash_password_blocking(body.admin_password).await?;

    let registration = HospitalRegistration {
        hospital: NewHospital {
            name: body.name,
            email: body.email,
            phone: body.phone,
            address: body.address,
            primary_contact_name: body.primary_contact_name,
        },
        admin: NewUser {
            name: body.admin_name,
            email: body.admin_email,
            password_hash,
        },
    };

    let overview = state.storage().register_hospital(registration).await?;
    info!(hospital_id = %overview.hospital.id, "Hospital registration submitted");

    let body = serde_json::json!({
        "success": true,
        "message": "Hospital registration submitted successfully. The system owner will review your application.",
        "hospital": {
            "id": overview.hospital.id,
            "name": overview.hospital.name,
            "status": overview.hospital.status,
        }
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Handler listing hospitals, newest first.
///
/// # HTTP Request
///
/// `GET /hospitals?status=PENDING`
pub async fn list_handler<S>(
    State(state): State<AppState<S>>,
    SuperAdmin(principal): SuperAdmin,
    Query(params): Query<HospitalListParams>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let status = params.status()?;
    debug!(?status, "Processing hospital list request");

    let hospitals = state.storage().list_hospitals(&principal, status).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": hospitals.len(),
        "hospitals": hospitals,
    }))
    .into_response())
}

/// Handler for a single hospital with its admin account.
///
/// # HTTP Request
///
/// `GET /hospitals/{id}`
pub async fn get_handler<S>(
    State(state): State<AppState<S>>,
    SuperAdmin(principal): SuperAdmin,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let hospital = state
        .storage()
        .get_hospital(&principal, &HospitalId::new(id))
        .await?;
    Ok(Json(serde_json::json!({"success": true, "hospital": hospital})).into_response())
}

/// Handler listing one hospital's patients.
///
/// # HTTP Request
///
/// `GET /hospitals/{id}/patients`
pub async fn patients_handler<S>(
    State(state): State<AppState<S>>,
    SuperAdmin(principal): SuperAdmin,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let hospital_id = HospitalId::new(id);
    // Unknown hospitals are a 404, not an empty list.
    state.storage().get_hospital(&principal, &hospital_id).await?;

    let patients = state
        .storage()
        .list_patients(&principal, &PatientQuery::in_hospital(hospital_id))
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": patients.len(),
        "patients": patients,
    }))
    .into_response())
}

/// Handler approving a hospital and activating its admin.
///
/// # HTTP Request
///
/// `PATCH /hospitals/{id}/approve`
pub async fn approve_handler<S>(
    state: State<AppState<S>>,
    owner: SuperAdmin,
    id: Path<String>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    set_status(state, owner, id, HospitalStatus::Approved, "Hospital approved successfully").await
}

/// Handler rejecting a hospital and deactivating its admin.
///
/// # HTTP Request
///
/// `PATCH /hospitals/{id}/reject`
pub async fn reject_handler<S>(
    state: State<AppState<S>>,
    owner: SuperAdmin,
    id: Path<String>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    set_status(state, owner, id, HospitalStatus::Rejected, "Hospital rejected").await
}

async fn set_status<S>(
    State(state): State<AppState<S>>,
    SuperAdmin(principal): SuperAdmin,
    Path(id): Path<String>,
    status: HospitalStatus,
    message: &str,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let hospital = state
        .storage()
        .set_hospital_status(&principal, &HospitalId::new(id), status)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": message,
        "hospital": hospital,
    }))
    .into_response())
}
