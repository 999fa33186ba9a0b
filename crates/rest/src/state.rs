//! Application state for the MedQR REST API.
//!
//! This module defines the shared application state that is available to all
//! request handlers: the storage backend, the configuration, the session
//! token issuer and the QR image store.

use std::sync::Arc;

use medqr_persistence::core::Storage;

use crate::auth::TokenIssuer;
use crate::config::ServerConfig;
use crate::qr::{FileQrStore, QrImageStore};

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `S` - The storage backend type (must implement [`Storage`])
///
/// # Example
///
/// ```rust,ignore
/// use medqr_rest::{AppState, ServerConfig};
/// use medqr_persistence::backends::sqlite::SqliteBackend;
/// use std::sync::Arc;
///
/// let backend = SqliteBackend::in_memory()?;
/// let state = AppState::new(Arc::new(backend), ServerConfig::for_testing());
/// ```
pub struct AppState<S> {
    /// The storage backend.
    storage: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,

    /// Session token issuer.
    tokens: Arc<TokenIssuer>,

    /// Where QR images are written.
    qr_images: Arc<dyn QrImageStore>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
            tokens: Arc::clone(&self.tokens),
            qr_images: Arc::clone(&self.qr_images),
        }
    }
}

impl<S: Storage> AppState<S> {
    /// Creates a new AppState that writes QR images to `config.upload_dir`.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        let qr_images = Arc::new(FileQrStore::new(config.upload_dir.clone()));
        Self::with_qr_store(storage, config, qr_images)
    }

    /// Creates a new AppState with a custom QR image store.
    pub fn with_qr_store(
        storage: Arc<S>,
        config: ServerConfig,
        qr_images: Arc<dyn QrImageStore>,
    ) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl());
        Self {
            storage,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            qr_images,
        }
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the session token issuer.
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Returns the QR image store.
    pub fn qr_images(&self) -> &dyn QrImageStore {
        self.qr_images.as_ref()
    }
}
