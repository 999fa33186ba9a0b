//! Login and session handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use medqr_persistence::core::Storage;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::{LoginAudience, authenticate};
use crate::error::{RestError, RestResult};
use crate::extractors::{Authenticated, JsonBody};
use crate::state::AppState;

/// Body of the login routes.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Plain text password.
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    fn credentials(self) -> RestResult<(String, String)> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(RestError::validation("Please provide email and password")),
        }
    }
}

/// Handler for staff and owner login.
///
/// # HTTP Request
///
/// `POST /auth/login`
///
/// # Response
///
/// - `200 OK` - `{success, message, token, user}`
/// - `400 Bad Request` - Missing email or password
/// - `401 Unauthorized` - Unknown email or wrong password
/// - `403 Forbidden` - Hospital not approved yet
pub async fn login_handler<S>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    login(&state, body, LoginAudience::Any).await
}

/// Handler for patient portal login.
///
/// Same as [`login_handler`], but only `PATIENT` accounts may sign in.
///
/// # HTTP Request
///
/// `POST /auth/patient-login`
pub async fn patient_login_handler<S>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    login(&state, body, LoginAudience::PatientsOnly).await
}

async fn login<S>(
    state: &AppState<S>,
    body: LoginRequest,
    audience: LoginAudience,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let (email, password) = body.credentials()?;
    debug!(?audience, "Processing login request");

    let (user, principal) = authenticate(state.storage(), &email, &password, audience).await?;
    let token = state.tokens().issue(&principal)?;

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": user.profile(),
    }))
    .into_response())
}

/// Handler returning the caller's own account.
///
/// # HTTP Request
///
/// `GET /auth/me`
pub async fn me_handler<S>(
    State(state): State<AppState<S>>,
    Authenticated(principal): Authenticated,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let user = state
        .storage()
        .find_user(principal.user_id())
        .await?
        .ok_or_else(|| RestError::unauthenticated("account no longer exists"))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "user": user.profile(),
    }))
    .into_response())
}
