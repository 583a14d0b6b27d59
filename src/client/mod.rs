//! HTTP client for the items API, mirroring what the report form does:
//! check the fields locally, compress the photo, submit one multipart request.

pub mod compress;

pub use compress::{compress_image, Compressed, CompressionOptions};

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{ErrorResponse, ItemListResponse, ItemResponse, ItemStatus, LostItem};

#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected locally before anything was sent.
    #[error("{0}")]
    Invalid(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Image compression task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A photo picked by the finder.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl ImageFile {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Fields the finder fills in.
#[derive(Debug, Clone, Default)]
pub struct ItemReport {
    pub name: String,
    pub description: String,
    pub location_found: String,
    pub item_type: String,
    pub color: String,
    pub contact_info: String,
    pub contact_number: String,
    pub status: ItemStatus,
}

impl ItemReport {
    /// Advisory check; the server validates again.
    pub fn missing_required(&self) -> bool {
        [
            &self.name,
            &self.description,
            &self.location_found,
            &self.item_type,
            &self.contact_info,
            &self.contact_number,
        ]
        .iter()
        .any(|v| v.is_empty())
    }
}

#[derive(Clone)]
pub struct ItemsClient {
    client: Client,
    base_url: String,
    compression: CompressionOptions,
}

impl ItemsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            compression: CompressionOptions::default(),
        })
    }

    pub fn with_compression(mut self, compression: CompressionOptions) -> Self {
        self.compression = compression;
        self
    }

    fn items_url(&self) -> String {
        format!("{}/api/items", self.base_url)
    }

    pub async fn create(
        &self,
        report: &ItemReport,
        image: Option<ImageFile>,
    ) -> Result<LostItem, ClientError> {
        let image = image.ok_or_else(|| ClientError::Invalid("Please upload an image!".into()))?;
        if !image.is_image() {
            return Err(ClientError::Invalid("Please select an image file only!".into()));
        }
        if report.missing_required() {
            return Err(ClientError::Invalid("Please fill all required fields!".into()));
        }

        let image = self.compress(image).await?;
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;

        let form = Form::new()
            .part("image", part)
            .text("name", report.name.clone())
            .text("description", report.description.clone())
            .text("locationFound", report.location_found.clone())
            .text("itemType", report.item_type.clone())
            .text("color", report.color.clone())
            .text("contactInfo", report.contact_info.clone())
            .text("contactNumber", report.contact_number.clone())
            .text("status", report.status.as_str());

        let response = self
            .client
            .post(self.items_url())
            .multipart(form)
            .send()
            .await?;
        let created: ItemResponse = Self::parse(response).await?;
        Ok(created.data)
    }

    pub async fn list(&self) -> Result<ItemListResponse, ClientError> {
        let response = self.client.get(self.items_url()).send().await?;
        Self::parse(response).await
    }

    pub async fn get(&self, id: &str) -> Result<LostItem, ClientError> {
        let response = self
            .client
            .get(format!("{}/{}", self.items_url(), id))
            .send()
            .await?;
        let found: ItemResponse = Self::parse(response).await?;
        Ok(found.data)
    }

    /// Falls back to the original photo when it cannot be decoded.
    async fn compress(&self, image: ImageFile) -> Result<ImageFile, ClientError> {
        let options = self.compression;
        let bytes = image.bytes.clone();
        let result = tokio::task::spawn_blocking(move || compress_image(&bytes, &options)).await?;

        Ok(match result {
            Ok(Compressed::Original) => image,
            Ok(Compressed::Jpeg(bytes)) => ImageFile {
                bytes,
                file_name: jpeg_file_name(&image.file_name),
                content_type: "image/jpeg".to_string(),
            },
            Err(e) => {
                tracing::warn!("Image compression failed, sending original: {}", e);
                image
            }
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn jpeg_file_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    format!("{}.jpg", stem)
}
