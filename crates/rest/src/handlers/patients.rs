//! Patient record handlers.
//!
//! Every route here runs behind the auth middleware. Tenant scoping happens
//! in storage, so a record outside the caller's scope is a plain 404.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use medqr_persistence::core::{PatientQuery, Storage};
use medqr_persistence::tenant::PatientId;
use medqr_persistence::types::{NewUser, Patient, PatientDraft};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::password::{hash_password_blocking, validate_password_strength};
use crate::error::RestResult;
use crate::extractors::{Authenticated, JsonBody};
use crate::qr::emergency_url;
use crate::state::AppState;

/// Portal login requested together with a new patient.
#[derive(Debug, Deserialize)]
pub struct PortalAccessRequest {
    /// Login email of the portal account.
    #[serde(default)]
    pub email: String,
    /// Password of the portal account.
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /patients`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    /// The medical record.
    #[serde(flatten)]
    pub draft: PatientDraft,
    /// Optional portal account for the patient.
    pub portal_access: Option<PortalAccessRequest>,
}

/// Handler listing the patients visible to the caller, newest first.
///
/// # HTTP Request
///
/// `GET /patients`
pub async fn list_handler<S>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    debug!(role = %principal.role(), "Processing patient list request");

    let patients = state
        .storage()
        .list_patients(&principal, &PatientQuery::default())
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": patients.len(),
        "patients": patients,
    }))
    .into_response())
}

/// Handler for a single patient.
///
/// # HTTP Request
///
/// `GET /patients/{id}`
pub async fn get_handler<S>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let patient = state
        .storage()
        .get_patient(&principal, &PatientId::new(id))
        .await?;
    Ok(Json(serde_json::json!({"success": true, "patient": patient})).into_response())
}

/// Handler creating a patient and its QR image.
///
/// Hospital admins always file into their own hospital. The owner must name
/// an existing `hospital`. When the QR image cannot be written the record is
/// removed again and the request fails.
///
/// # HTTP Request
///
/// `POST /patients`
///
/// # Response
///
/// - `201 Created` - `{success, message, patient}`
/// - `400 Bad Request` - Validation failure
/// - `403 Forbidden` - Patient accounts cannot create records
pub async fn create_handler<S>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
    JsonBody(body): JsonBody<CreatePatientRequest>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let portal = match body.portal_access {
        Some(access) => {
            validate_password_strength("portalAccess.password", &access.password)?;
            Some(NewUser {
                name: body.draft.full_name.clone().unwrap_or_default(),
                email: access.email,
                password_hash: hash_password_blocking(access.password).await?,
            })
        }
        None => None,
    };

    let patient = state
        .storage()
        .create_patient(&principal, body.draft, portal)
        .await?;

    if let Err(e) = render_qr_image(&state, &patient).await {
        warn!(patient_id = %patient.id, error = %e, "QR image generation failed, removing patient");
        if let Err(cleanup) = state.storage().delete_patient(&principal, &patient.id).await {
            warn!(patient_id = %patient.id, error = %cleanup, "Failed to remove patient after QR failure");
        }
        return Err(e);
    }

    info!(patient_id = %patient.id, hospital_id = %patient.hospital, "Patient created");

    let body = serde_json::json!({
        "success": true,
        "message": "Patient created successfully",
        "patient": patient,
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn render_qr_image<S>(state: &AppState<S>, patient: &Patient) -> RestResult<()>
where
    S: Storage + 'static,
{
    let url = emergency_url(&state.config().frontend_url, &patient.qr_token);
    let path = state.qr_images().store(&patient.qr_token, &url).await?;
    debug!(patient_id = %patient.id, path = %path, "Stored QR image");
    Ok(())
}

/// Handler applying a partial update.
///
/// `id`, `hospital`, `qrToken` and `qrCodeUrl` in the body are ignored.
///
/// # HTTP Request
///
/// `PUT /patients/{id}`
pub async fn update_handler<S>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<PatientDraft>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let patient = state
        .storage()
        .update_patient(&principal, &PatientId::new(id), patch)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Patient updated successfully",
        "patient": patient,
    }))
    .into_response())
}

/// Handler deleting a patient, its portal account and its QR image.
///
/// # HTTP Request
///
/// `DELETE /patients/{id}`
pub async fn delete_handler<S>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let removed = state
        .storage()
        .delete_patient(&principal, &PatientId::new(id))
        .await?;

    remove_qr_image(&state, &removed).await;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Patient deleted successfully",
    }))
    .into_response())
}

// Best effort: the record is already gone.
async fn remove_qr_image<S>(state: &AppState<S>, patient: &Patient)
where
    S: Storage + 'static,
{
    if let Err(e) = state.qr_images().remove(&patient.qr_token).await {
        warn!(patient_id = %patient.id, error = %e, "Failed to remove QR image");
    }
}

