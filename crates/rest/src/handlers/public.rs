//! Public emergency lookup.
//!
//! The only unauthenticated read path. It is keyed by QR token alone and
//! returns the emergency projection, never the full record.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use medqr_persistence::core::Storage;
use medqr_persistence::types::QrToken;
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Handler resolving a scanned QR token.
///
/// # HTTP Request
///
/// `GET /public/patient/{token}`
///
/// # Response
///
/// - `200 OK` - `{success, patient}` with the emergency fields only
/// - `404 Not Found` - `TokenNotFound`, whatever the token looks like
pub async fn resolve_handler<S>(
    State(state): State<AppState<S>>,
    Path(token): Path<String>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let token = QrToken::new(token);
    debug!(token = ?token, "Resolving QR token");

    let view = state.storage().resolve_qr_token(&token).await?;
    Ok(Json(serde_json::json!({"success": true, "patient": view})).into_response())
}
