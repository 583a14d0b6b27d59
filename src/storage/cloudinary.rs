use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::CloudinaryConfig;
use crate::error::{AppError, AppResult};
use crate::models::UploadedMedia;

use super::MediaStore;

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Bound the longest edge at 1920px, then let Cloudinary pick the quality.
pub const UPLOAD_TRANSFORMATION: &str = "c_limit,w_1920/q_auto:good";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

pub struct CloudinaryBackend {
    config: CloudinaryConfig,
    api_base: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryBackend {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            api_base: DEFAULT_API_BASE.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Points the backend at another API host (a proxy or a local stand-in).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base, self.config.cloud_name, action)
    }

    /// Signs request parameters: sorted `key=value` pairs joined by `&`,
    /// followed by the API secret, hashed with SHA-1.
    pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
        let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let digest = ring::digest::digest(
            &ring::digest::SHA1_FOR_LEGACY_USE_ONLY,
            format!("{}{}", to_sign, api_secret).as_bytes(),
        );
        digest
            .as_ref()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    fn timestamp() -> String {
        Utc::now().timestamp().to_string()
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        format!("{} - {}", status, detail)
    }
}

/// Builds the `file` part. A content type that does not parse is sent as
/// `application/octet-stream`; Cloudinary sniffs the bytes either way.
fn file_part(data: &[u8], content_type: &str) -> AppResult<Part> {
    let part = || Part::bytes(data.to_vec()).file_name("upload");
    match part().mime_str(content_type) {
        Ok(file) => Ok(file),
        Err(_) => {
            tracing::debug!(
                "Unparseable content type '{}', sending as {}",
                content_type,
                FALLBACK_CONTENT_TYPE
            );
            part()
                .mime_str(FALLBACK_CONTENT_TYPE)
                .map_err(|e| AppError::Storage(format!("Invalid content type: {}", e)))
        }
    }
}

#[async_trait::async_trait]
impl MediaStore for CloudinaryBackend {
    async fn upload(&self, data: &[u8], content_type: &str) -> AppResult<UploadedMedia> {
        if data.is_empty() {
            return Err(AppError::Storage("No image data provided".to_string()));
        }

        let timestamp = Self::timestamp();
        let signature = Self::sign(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
                ("transformation", UPLOAD_TRANSFORMATION),
            ],
            &self.config.api_secret,
        );

        let file = file_part(data, content_type)?;
        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("transformation", UPLOAD_TRANSFORMATION)
            .text("signature", signature)
            .part("file", file);

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Cloudinary request failed: {}", e)))?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            tracing::error!("Cloudinary upload failed: {}", message);
            return Err(AppError::Storage(format!("Cloudinary upload failed: {}", message)));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Invalid Cloudinary response: {}", e)))?;

        tracing::info!(
            "Cloudinary upload: public_id={}, size={}",
            uploaded.public_id,
            data.len()
        );
        Ok(UploadedMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        let timestamp = Self::timestamp();
        let signature = Self::sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .http_client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Cloudinary request failed: {}", e)))?;

        if !response.status().is_success() {
            let message = Self::error_message(response).await;
            return Err(AppError::Storage(format!("Cloudinary delete failed: {}", message)));
        }

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Invalid Cloudinary response: {}", e)))?;
        if destroyed.result != "ok" {
            return Err(AppError::Storage(format!(
                "Cloudinary delete of {} returned '{}'",
                public_id, destroyed.result
            )));
        }

        tracing::info!("Cloudinary delete: public_id={}", public_id);
        Ok(())
    }

    fn name(&self) -> &str {
        "cloudinary"
    }
}
