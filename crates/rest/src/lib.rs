//! # medqr-rest - HTTP API for the MedQR emergency health server
//!
//! This crate exposes the MedQR patient registry over HTTP. Hospitals
//! register and wait for approval by the system owner, approved hospital
//! admins manage their own patients, and every patient record carries a QR
//! code that opens a public emergency view.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use medqr_rest::{create_app_with_config, ServerConfig};
//! use medqr_persistence::backends::sqlite::SqliteBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SqliteBackend::open("medqr.db")?;
//!     backend.init_schema()?;
//!
//!     let config = ServerConfig::from_env()?;
//!     let app = create_app_with_config(backend, config)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Route | Method | Access |
//! |-------|--------|--------|
//! | `/auth/login` | POST | public |
//! | `/auth/patient-login` | POST | public |
//! | `/auth/me` | GET | any account |
//! | `/hospitals/register` | POST | public |
//! | `/hospitals` | GET | owner |
//! | `/hospitals/{id}` | GET | owner |
//! | `/hospitals/{id}/patients` | GET | owner |
//! | `/hospitals/{id}/approve` | PATCH | owner |
//! | `/hospitals/{id}/reject` | PATCH | owner |
//! | `/patients` | GET, POST | scoped |
//! | `/patients/{id}` | GET, PUT, DELETE | scoped |
//! | `/public/patient/{token}` | GET | public |
//! | `/uploads/qr-{token}.png` | GET | public |
//!
//! Authenticated routes expect `Authorization: Bearer <token>` with a token
//! from one of the login routes.
//!
//! ## Error Handling
//!
//! Errors are JSON bodies of the form
//! `{"success": false, "error": "<Kind>", "message": "<text>"}`. See
//! [`error`] for the kinds and their status codes.
//!
//! ## Architecture
//!
//! - [`auth`] - Session tokens, password hashing, credential checks
//! - [`bootstrap`] - Owner account provisioning
//! - [`config`] - Server configuration
//! - [`error`] - Error types and their HTTP mapping
//! - [`extractors`] - Principal and JSON body extractors
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Session token verification and request ids
//! - [`qr`] - QR image rendering and storage
//! - [`routing`] - Route configuration
//! - [`state`] - Application state

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod qr;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use medqr_persistence::core::Storage;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with custom configuration.
///
/// The configuration is validated first, so an app is never built around an
/// empty or short signing secret. QR images are written to `config.upload_dir`.
///
/// # Example
///
/// ```rust,ignore
/// use medqr_rest::{create_app_with_config, ServerConfig};
/// use medqr_persistence::backends::sqlite::SqliteBackend;
///
/// let backend = SqliteBackend::in_memory()?;
/// backend.init_schema()?;
/// let config = ServerConfig {
///     jwt_secret: std::env::var("MEDQR_JWT_SECRET")?,
///     enable_cors: true,
///     ..ServerConfig::default()
/// };
/// let app = create_app_with_config(backend, config)?;
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> RestResult<Router>
where
    S: Storage + 'static,
{
    config
        .validate()
        .map_err(|errors| RestError::validation(errors.join("; ")))?;

    let state = AppState::new(Arc::new(storage), config);
    Ok(create_app_with_state(state))
}

/// Creates the Axum application from prepared state.
///
/// Use this to share the storage with other tasks or to plug in a custom
/// [`QrImageStore`](qr::QrImageStore).
pub fn create_app_with_state<S>(state: AppState<S>) -> Router
where
    S: Storage + 'static,
{
    let config = state.config().clone();
    info!(
        "Creating REST API server with backend: {}",
        state.storage().backend_name()
    );

    let router = routing::create_routes(state);

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = router.layer(DefaultBodyLimit::max(config.max_body_size));

    // Add CORS if enabled
    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    let router = router.layer(service_builder);

    if config.enable_request_id {
        middleware::request_id::with_request_id(router)
    } else {
        router
    }
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    // Configure origins
    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    // Configure methods
    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    // Configure headers
    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` overrides
/// the filter derived from `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "medqr_rest={level},medqr_persistence={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use medqr_persistence::backends::sqlite::SqliteBackend;

    fn backend() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        backend
    }

    #[test]
    fn test_app_requires_signing_secret() {
        let err = create_app_with_config(backend(), ServerConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("JWT secret"));
    }

    #[test]
    fn test_app_builds_from_valid_config() {
        let config = ServerConfig {
            port: 5000,
            jwt_secret: "a-deployment-secret-of-sufficient-length".to_string(),
            owner_password: None,
            ..ServerConfig::default()
        };
        assert!(create_app_with_config(backend(), config).is_ok());
    }
}
