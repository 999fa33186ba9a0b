//! Server configuration for the MedQR REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MEDQR_SERVER_PORT` | 5000 | Server port |
//! | `MEDQR_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `MEDQR_LOG_LEVEL` | info | Log level |
//! | `MEDQR_DATABASE_URL` | medqr.db | SQLite database path, or `:memory:` |
//! | `MEDQR_JWT_SECRET` | (required) | HMAC secret for session tokens, at least 32 bytes |
//! | `MEDQR_TOKEN_TTL_HOURS` | 168 | Session token lifetime (hours) |
//! | `MEDQR_FRONTEND_URL` | http://localhost:5173 | Base URL encoded into QR codes |
//! | `MEDQR_UPLOAD_DIR` | uploads | Directory for QR images, served at `/uploads` |
//! | `MEDQR_OWNER_EMAIL` | owner@smartqr.com | Email of the bootstrap owner account |
//! | `MEDQR_OWNER_PASSWORD` | (generated) | Password of the bootstrap owner account |
//! | `MEDQR_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `MEDQR_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `MEDQR_ENABLE_CORS` | true | Enable CORS |
//! | `MEDQR_CORS_ORIGINS` | * | Allowed origins |
//! | `MEDQR_CORS_METHODS` | GET,POST,PUT,PATCH,DELETE,OPTIONS | Allowed methods |
//! | `MEDQR_CORS_HEADERS` | Content-Type,Authorization,Accept | Allowed headers |
//! | `MEDQR_ENABLE_REQUEST_ID` | true | Tag requests with `x-request-id` |
//!
//! # Example
//!
//! ```rust
//! use medqr_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Minimum length of the token signing secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Server configuration for the MedQR REST API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Clone, Parser)]
#[command(name = "medqr")]
#[command(about = "MedQR emergency health record server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "MEDQR_SERVER_PORT", default_value = "5000")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "MEDQR_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "MEDQR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// SQLite database path, or `:memory:`.
    #[arg(long, env = "MEDQR_DATABASE_URL", default_value = "medqr.db")]
    pub database_url: String,

    /// HMAC secret used to sign session tokens.
    #[arg(long, env = "MEDQR_JWT_SECRET", default_value = "", hide_env_values = true)]
    pub jwt_secret: String,

    /// Session token lifetime in hours.
    #[arg(long, env = "MEDQR_TOKEN_TTL_HOURS", default_value = "168")]
    pub token_ttl_hours: u64,

    /// Public URL of the web client; QR codes point at `<url>/emergency/<token>`.
    #[arg(long, env = "MEDQR_FRONTEND_URL", default_value = "http://localhost:5173")]
    pub frontend_url: String,

    /// Directory where QR images are written.
    #[arg(long, env = "MEDQR_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Email of the owner account created at startup.
    #[arg(long, env = "MEDQR_OWNER_EMAIL", default_value = "owner@smartqr.com")]
    pub owner_email: String,

    /// Password of the owner account. Generated and logged once if unset.
    #[arg(long, env = "MEDQR_OWNER_PASSWORD", hide_env_values = true)]
    pub owner_password: Option<String>,

    /// Maximum request body size in bytes.
    #[arg(long, env = "MEDQR_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "MEDQR_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "MEDQR_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "MEDQR_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "MEDQR_CORS_METHODS",
        default_value = "GET,POST,PUT,PATCH,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "MEDQR_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// Enable request ID tracking.
    #[arg(long, env = "MEDQR_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            database_url: "medqr.db".to_string(),
            jwt_secret: String::new(),
            token_ttl_hours: 168,
            frontend_url: "http://localhost:5173".to_string(),
            upload_dir: PathBuf::from("uploads"),
            owner_email: "owner@smartqr.com".to_string(),
            owner_password: None,
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,PATCH,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            enable_request_id: true,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("host", &self.host)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("frontend_url", &self.frontend_url)
            .field("upload_dir", &self.upload_dir)
            .field("owner_email", &self.owner_email)
            .field(
                "owner_password",
                &self.owner_password.as_ref().map(|_| "<redacted>"),
            )
            .field("max_body_size", &self.max_body_size)
            .field("request_timeout", &self.request_timeout)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments. A malformed value is an error rather
    /// than a silent fallback to the defaults.
    pub fn from_env() -> Result<Self, clap::Error> {
        Self::try_parse_from(["medqr"])
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the session token lifetime.
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_hours * 3600)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            errors.push(format!(
                "JWT secret must be at least {} bytes (set MEDQR_JWT_SECRET)",
                MIN_JWT_SECRET_LEN
            ));
        }

        if self.token_ttl_hours == 0 {
            errors.push("Token TTL cannot be 0".to_string());
        }

        if self.database_url.trim().is_empty() {
            errors.push("Database URL cannot be empty".to_string());
        }

        if !self.frontend_url.starts_with("http://") && !self.frontend_url.starts_with("https://")
        {
            errors.push("Frontend URL must start with http:// or https://".to_string());
        }

        if let Some(password) = &self.owner_password {
            if password.len() < crate::auth::MIN_PASSWORD_LEN {
                errors.push(format!(
                    "Owner password must be at least {} characters",
                    crate::auth::MIN_PASSWORD_LEN
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0, an in-memory database and a fixed signing
    /// secret. Callers should point `upload_dir` at a temporary directory.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            database_url: ":memory:".to_string(),
            jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
            token_ttl_hours: 1,
            frontend_url: "http://localhost:5173".to_string(),
            upload_dir: std::env::temp_dir().join("medqr-test-uploads"),
            owner_email: "owner@smartqr.com".to_string(),
            owner_password: Some("owner-password".to_string()),
            max_body_size: 10 * 1024 * 1024,
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            enable_request_id: false,
        }
    }
}
