//! API route configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, patch, post},
};
use medqr_persistence::core::Storage;
use medqr_persistence::types::UPLOADS_PATH;
use tower_http::services::ServeDir;

use crate::handlers;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Creates all API routes.
///
/// # Routes
///
/// ## Public
/// - `POST /auth/login` - Staff and owner login
/// - `POST /auth/patient-login` - Patient portal login
/// - `POST /hospitals/register` - Hospital self-registration
/// - `GET /public/patient/{token}` - Emergency lookup by QR token
/// - `GET /uploads/qr-{token}.png` - QR images
/// - `GET /health`, `/_liveness`, `/_readiness` - Health checks
///
/// ## Authenticated
/// - `GET /auth/me` - Current account
/// - `GET /hospitals` - List hospitals (owner)
/// - `GET /hospitals/{id}` - Read a hospital (owner)
/// - `GET /hospitals/{id}/patients` - A hospital's patients (owner)
/// - `PATCH /hospitals/{id}/approve`, `/reject` - Status changes (owner)
/// - `GET /patients`, `POST /patients` - List and create
/// - `GET /patients/{id}`, `PUT /patients/{id}`, `DELETE /patients/{id}`
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: Storage + 'static,
{
    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me_handler::<S>))
        .route("/hospitals", get(handlers::hospitals::list_handler::<S>))
        .route("/hospitals/{id}", get(handlers::hospitals::get_handler::<S>))
        .route(
            "/hospitals/{id}/patients",
            get(handlers::hospitals::patients_handler::<S>),
        )
        .route(
            "/hospitals/{id}/approve",
            patch(handlers::hospitals::approve_handler::<S>),
        )
        .route(
            "/hospitals/{id}/reject",
            patch(handlers::hospitals::reject_handler::<S>),
        )
        .route(
            "/patients",
            get(handlers::patients::list_handler::<S>).post(handlers::patients::create_handler::<S>),
        )
        .route(
            "/patients/{id}",
            get(handlers::patients::get_handler::<S>)
                .put(handlers::patients::update_handler::<S>)
                .delete(handlers::patients::delete_handler::<S>),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth::<S>));

    let uploads = ServeDir::new(state.config().upload_dir.clone());

    Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<S>))
        .route("/auth/login", post(handlers::auth::login_handler::<S>))
        .route(
            "/auth/patient-login",
            post(handlers::auth::patient_login_handler::<S>),
        )
        .route(
            "/hospitals/register",
            post(handlers::hospitals::register_handler::<S>),
        )
        .route(
            "/public/patient/{token}",
            get(handlers::public::resolve_handler::<S>),
        )
        .merge(protected)
        .nest_service(UPLOADS_PATH, uploads)
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "error": "NotFound",
            "message": "Route not found",
        })),
    )
}
