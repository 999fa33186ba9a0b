//! QR code images.
//!
//! Every patient record gets a PNG that encodes the public emergency URL
//! `{frontend_url}/emergency/{token}`. Images live in the upload directory
//! as `qr-{token}.png` and are served under `/uploads`.
//!
//! The [`QrImageStore`] trait is the seam between the handlers and the
//! filesystem, so tests can substitute a store that fails on demand.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::{ImageFormat, Luma};
use medqr_persistence::types::QrToken;
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::error::{RestError, RestResult};

/// Minimum edge length of a rendered QR image, in pixels.
pub const MIN_IMAGE_SIZE: u32 = 400;

/// Builds the public emergency URL for a token.
pub fn emergency_url(frontend_url: &str, token: &QrToken) -> String {
    format!("{}/emergency/{}", frontend_url.trim_end_matches('/'), token)
}

/// Failures while producing or removing a QR image.
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    /// The content does not fit in a QR code.
    #[error("failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// PNG encoding failed.
    #[error("failed to write QR image: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem failure.
    #[error("QR image I/O failed for {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The blocking render task panicked or was cancelled.
    #[error("QR rendering task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<QrError> for RestError {
    fn from(err: QrError) -> Self {
        RestError::internal(err.to_string())
    }
}

/// Renders `content` as a PNG QR code with a quiet zone.
pub fn render_png(content: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::M)?;

    let image = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .min_dimensions(MIN_IMAGE_SIZE, MIN_IMAGE_SIZE)
        .build();

    let mut bytes = std::io::Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Storage for rendered QR images.
#[async_trait]
pub trait QrImageStore: Send + Sync {
    /// Renders and stores the image for `token`, encoding `target_url`.
    ///
    /// Returns the public path of the image.
    async fn store(&self, token: &QrToken, target_url: &str) -> RestResult<String>;

    /// Removes the image for `token`. Removing a missing image succeeds.
    async fn remove(&self, token: &QrToken) -> RestResult<()>;
}

/// Stores QR images as files in a directory.
#[derive(Debug, Clone)]
pub struct FileQrStore {
    dir: PathBuf,
}

impl FileQrStore {
    /// Creates a store writing into `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory images are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, token: &QrToken) -> PathBuf {
        self.dir.join(token.image_file_name())
    }
}

#[async_trait]
impl QrImageStore for FileQrStore {
    async fn store(&self, token: &QrToken, target_url: &str) -> RestResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| QrError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let content = target_url.to_string();
        let png = tokio::task::spawn_blocking(move || render_png(&content))
            .await
            .map_err(QrError::from)??;

        let path = self.path_for(token);
        tokio::fs::write(&path, png)
            .await
            .map_err(|source| QrError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "Stored QR image");
        Ok(token.image_path())
    }

    async fn remove(&self, token: &QrToken) -> RestResult<()> {
        let path = self.path_for(token);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(QrError::Io { path, source }.into()),
        }
    }
}
