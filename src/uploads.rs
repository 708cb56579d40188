use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::fs;

pub const PHOTO_FIELD: &str = "photo";
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Rejections raised while reading an uploaded attachment. All of them
/// happen before anything touches disk.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Only image files are allowed!")]
    NotAnImage(Option<String>),
    #[error("File too large")]
    TooLarge,
    #[error("Unexpected field")]
    UnexpectedField(String),
    #[error("Malformed form data")]
    Malformed(#[source] MultipartError),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge
        } else {
            UploadError::Malformed(e)
        }
    }
}

/// A validated photo held in memory until the submission is complete.
#[derive(Debug)]
pub struct PendingPhoto {
    pub field: String,
    pub original_name: String,
    pub data: Bytes,
}

impl PendingPhoto {
    /// Check the declared content type, then buffer the body while enforcing
    /// the size cap.
    pub async fn read(mut field: Field<'_>) -> Result<Self, UploadError> {
        let content_type = field.content_type().map(str::to_string);
        if !content_type.as_deref().is_some_and(|ct| ct.starts_with("image/")) {
            return Err(UploadError::NotAnImage(content_type));
        }

        let name = field.name().unwrap_or(PHOTO_FIELD).to_string();
        let original_name = field.file_name().unwrap_or_default().to_string();

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            if data.len() + chunk.len() > MAX_PHOTO_BYTES {
                return Err(UploadError::TooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        Ok(Self {
            field: name,
            original_name,
            data: data.freeze(),
        })
    }
}

/// Directory of stored attachments, served back under `/uploads`.
#[derive(Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the photo under a freshly generated name and return that name.
    pub async fn save(&self, photo: &PendingPhoto) -> std::io::Result<String> {
        let name = generate_filename(&photo.field, &photo.original_name);
        fs::write(self.dir.join(&name), &photo.data).await?;
        tracing::debug!(file = %name, bytes = photo.data.len(), "attachment stored");
        Ok(name)
    }

    pub async fn remove(&self, name: &str) {
        if let Err(e) = fs::remove_file(self.dir.join(name)).await {
            tracing::warn!(file = %name, "failed to remove attachment: {e}");
        }
    }
}

/// `<field>-<unix millis>-<random>.<ext>`, keeping the original extension
/// only when it is plain alphanumeric.
pub fn generate_filename(field: &str, original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::random_range(0..1_000_000_000);
    format!("{field}-{millis}-{suffix}{}", extension(original_name))
}

fn extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
