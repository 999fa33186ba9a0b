//! REST API test harness.
//!
//! Every harness gets its own in-memory database, a bootstrapped owner
//! account and a temporary upload directory.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::{TestResponse, TestServer};
use medqr_persistence::backends::sqlite::SqliteBackend;
use medqr_persistence::types::QrToken;
use medqr_rest::qr::{FileQrStore, QrImageStore};
use medqr_rest::{AppState, RestError, RestResult, ServerConfig, create_app_with_state};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::assertions::assert_status;
use super::fixtures::{ADMIN_PASSWORD, OWNER_EMAIL, OWNER_PASSWORD, admin_email, registration};

/// A QR store that always fails to write.
pub struct FailingQrStore;

#[async_trait]
impl QrImageStore for FailingQrStore {
    async fn store(&self, _token: &QrToken, _target_url: &str) -> RestResult<String> {
        Err(RestError::internal("disk full"))
    }

    async fn remove(&self, _token: &QrToken) -> RestResult<()> {
        Ok(())
    }
}

/// Test harness for REST API testing.
pub struct TestApp {
    /// The test server instance.
    pub server: TestServer,

    /// The storage backend.
    pub backend: Arc<SqliteBackend>,

    /// Server configuration.
    pub config: ServerConfig,

    uploads: TempDir,
}

impl TestApp {
    /// Creates a harness that writes QR images to a temp directory.
    pub async fn new() -> Self {
        Self::build(|dir| Arc::new(FileQrStore::new(dir))).await
    }

    /// Creates a harness whose QR image writes always fail.
    pub async fn with_failing_qr_store() -> Self {
        Self::build(|_| Arc::new(FailingQrStore)).await
    }

    async fn build(qr_store: impl FnOnce(&Path) -> Arc<dyn QrImageStore>) -> Self {
        let uploads = tempfile::tempdir().expect("Failed to create upload dir");
        let config = ServerConfig {
            upload_dir: uploads.path().to_path_buf(),
            ..ServerConfig::for_testing()
        };

        let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
        backend.init_schema().expect("Failed to initialize schema");
        let backend = Arc::new(backend);

        medqr_rest::bootstrap::ensure_super_admin(backend.as_ref(), &config)
            .await
            .expect("Failed to bootstrap owner");

        let state = AppState::with_qr_store(
            Arc::clone(&backend),
            config.clone(),
            qr_store(uploads.path()),
        );
        let server =
            TestServer::new(create_app_with_state(state)).expect("Failed to create test server");

        Self {
            server,
            backend,
            config,
            uploads,
        }
    }

    /// Returns the directory QR images are written to.
    pub fn upload_dir(&self) -> &Path {
        self.uploads.path()
    }

    /// Posts credentials to `/auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/auth/login")
            .json(&json!({"email": email, "password": password}))
            .await
    }

    /// Logs in and returns the session token.
    pub async fn token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_status(&response, 200);
        let body: Value = response.json();
        body["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }

    /// Returns a session token for the system owner.
    pub async fn owner_token(&self) -> String {
        self.token(OWNER_EMAIL, OWNER_PASSWORD).await
    }

    /// Registers a hospital and returns its id.
    pub async fn register(&self, slug: &str) -> String {
        let response = self
            .server
            .post("/hospitals/register")
            .json(&registration(slug))
            .await;
        assert_status(&response, 201);
        let body: Value = response.json();
        body["hospital"]["id"]
            .as_str()
            .expect("registration returns the hospital id")
            .to_string()
    }

    /// Registers and approves a hospital, returning its id and an admin token.
    pub async fn approved_hospital(&self, slug: &str) -> (String, String) {
        let hospital_id = self.register(slug).await;
        let owner = self.owner_token().await;
        let response = self
            .server
            .patch(&format!("/hospitals/{hospital_id}/approve"))
            .authorization_bearer(&owner)
            .await;
        assert_status(&response, 200);

        let token = self.token(&admin_email(slug), ADMIN_PASSWORD).await;
        (hospital_id, token)
    }

    /// Creates a patient and returns the stored record.
    pub async fn create_patient(&self, token: &str, body: &Value) -> Value {
        let response = self
            .server
            .post("/patients")
            .authorization_bearer(token)
            .json(body)
            .await;
        assert_status(&response, 201);
        let body: Value = response.json();
        body["patient"].clone()
    }
}
