// src/upload_client.rs
use std::path::Path;

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::data_types::RawSheet;

pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UploadError {
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("upload request failed: {0}")]
    Transport(String),
    #[error("upload failed with HTTP status {0}")]
    Status(u16),
    #[error("no data received")]
    EmptyResponse,
    #[error("response is not a sheet: {0}")]
    InvalidResponse(String),
}

/// Advisory check only, the backend does the real format validation.
pub fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

pub struct UploadClient {
    endpoint: String,
    client: reqwest::Client,
}

impl UploadClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        UploadClient {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Posts the file as the `file` field of a multipart form and parses the
    /// backend's reply. A single attempt, no retry.
    pub async fn upload(&self, path: &Path) -> Result<RawSheet, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| UploadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.xlsx".to_string());

        log::info!("uploading {} ({} bytes) to {}", file_name, bytes.len(), self.endpoint);

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Self::parse_body(&body)
    }

    fn parse_body(body: &str) -> Result<RawSheet, UploadError> {
        if body.trim().is_empty() {
            return Err(UploadError::EmptyResponse);
        }

        let sheet: Option<RawSheet> =
            serde_json::from_str(body).map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        sheet.ok_or(UploadError::EmptyResponse)
    }
}
