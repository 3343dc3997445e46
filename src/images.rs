//! Image hosting client.
//!
//! The catalog only needs `upload(bytes) -> url`. Cloudinary is reached with
//! an unsigned upload preset, so no API secret lives in this service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

/// An image as received from the admin form.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl ImageUpload {
    /// Rejects non-image payloads and oversized files.
    pub fn validate(&self, max_bytes: usize) -> Result<(), UploadError> {
        if !self.content_type.starts_with("image/") { return Err(UploadError::NotAnImage(self.content_type.clone())); }
        if self.bytes.is_empty() { return Err(UploadError::Empty); }
        if self.bytes.len() > max_bytes { return Err(UploadError::TooLarge { size: self.bytes.len(), max: max_bytes }); }
        Ok(())
    }
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Stores the image and returns its durable URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, UploadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("only images are allowed, got {0}")]
    NotAnImage(String),
    #[error("image is empty")]
    Empty,
    #[error("image is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("image hosting is not configured")]
    NotConfigured,
    #[error("image host request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image host rejected upload: {0}")]
    Rejected(String),
}

impl UploadError {
    /// Whether the fault lies with the submitted payload rather than the host.
    pub fn is_client_error(&self) -> bool { matches!(self, Self::NotAnImage(_) | Self::Empty | Self::TooLarge { .. }) }
}

#[derive(Clone, Debug)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: String,
    folder: String,
}

#[derive(Deserialize)]
struct CloudinaryResponse {
    secure_url: Option<String>,
    error: Option<CloudinaryErrorBody>,
}

#[derive(Deserialize)]
struct CloudinaryErrorBody { message: String }

impl CloudinaryUploader {
    pub fn new(cloud_name: &str, upload_preset: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload"),
            upload_preset: upload_preset.into(),
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    #[instrument(skip(self, image), fields(size = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> Result<String, UploadError> {
        let public_id = Uuid::now_v7().to_string();
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name.unwrap_or_else(|| public_id.clone()))
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone())
            .text("public_id", public_id)
            .part("file", part);
        let resp = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status();
        let body: CloudinaryResponse = resp.json().await?;
        match (body.secure_url, body.error) {
            (Some(url), _) if status.is_success() => Ok(url),
            (_, Some(err)) => Err(UploadError::Rejected(err.message)),
            _ => Err(UploadError::Rejected(format!("unexpected response status {status}"))),
        }
    }
}

/// Used when no image host is configured; every upload fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledUploader;

#[async_trait]
impl ImageUploader for DisabledUploader {
    async fn upload(&self, _image: ImageUpload) -> Result<String, UploadError> { Err(UploadError::NotConfigured) }
}
