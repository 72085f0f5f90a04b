//! Image upload to the external image host.
//!
//! Unsigned multipart upload with a fixed preset and folder; the host answers
//! with a `secure_url` that goes into the entity's `imageUrl`. Files are
//! checked locally first so oversized or non-image files never leave the
//! machine.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::{HttpTimeouts, UploadConfig};
use crate::net::error::ApiError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub struct ImageUploader {
    http: reqwest::Client,
    config: UploadConfig,
}

impl ImageUploader {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: UploadConfig, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Upload raw image bytes and return the hosted URL.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUpload`] when the file fails local checks or the
    /// host rejects it; [`ApiError::Network`] when the host is unreachable.
    pub async fn upload(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        validate_image(content_type, bytes.len())?;

        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(content_type)
            .map_err(|e| ApiError::InvalidUpload(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", self.config.folder.clone());

        let response = self
            .http
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let url = parse_upload_response(status, &body)?;
        tracing::info!(file_name, %url, "image uploaded");
        Ok(url)
    }

    /// Upload a file from disk, inferring its content type from the extension.
    ///
    /// # Errors
    ///
    /// As [`ImageUploader::upload`], plus [`ApiError::InvalidUpload`] when the
    /// file cannot be read or its extension is not an image type.
    pub async fn upload_file(&self, path: &Path) -> Result<String, ApiError> {
        let content_type = content_type_for_path(path)
            .ok_or_else(|| ApiError::InvalidUpload(format!("{} is not a recognised image file", path.display())))?;
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("{}: {e}", path.display())))?;
        if metadata.len() > MAX_IMAGE_BYTES as u64 {
            return Err(too_large());
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |name| name.to_string_lossy().into_owned());
        self.upload(&file_name, content_type, bytes).await
    }
}

/// Local checks: non-empty, at most 5 MB, `image/*` content type.
///
/// # Errors
///
/// Returns [`ApiError::InvalidUpload`] describing the first failed check.
pub fn validate_image(content_type: &str, len: usize) -> Result<(), ApiError> {
    if !content_type.starts_with("image/") {
        return Err(ApiError::InvalidUpload(format!("'{content_type}' is not an image content type")));
    }
    if len == 0 {
        return Err(ApiError::InvalidUpload("image is empty".to_owned()));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(too_large());
    }
    Ok(())
}

fn too_large() -> ApiError {
    ApiError::InvalidUpload(format!("image exceeds the {} MB limit", MAX_IMAGE_BYTES / (1024 * 1024)))
}

#[must_use]
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    error: Option<UploadFailure>,
}

#[derive(Debug, Default, Deserialize)]
struct UploadFailure {
    message: String,
}

fn parse_upload_response(status: u16, body: &str) -> Result<String, ApiError> {
    let parsed = serde_json::from_str::<UploadResponse>(body).unwrap_or_default();
    if (200..300).contains(&status) {
        return parsed
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ApiError::Parse("upload response has no secure_url".to_owned()));
    }
    match parsed.error {
        Some(failure) => Err(ApiError::InvalidUpload(failure.message)),
        None => Err(ApiError::from_status(status, body)),
    }
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
