use std::sync::Arc;

use bytes::Bytes;

use crate::db::ItemStore;
use crate::error::{AppError, AppResult};
use crate::models::{ItemForm, LostItem};
use crate::storage::MediaStore;

/// The photo part of a create request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
    pub content_type: String,
}

pub struct ItemsService {
    items: Arc<dyn ItemStore>,
    media: Arc<dyn MediaStore>,
}

impl ItemsService {
    pub fn new(items: Arc<dyn ItemStore>, media: Arc<dyn MediaStore>) -> Self {
        Self { items, media }
    }

    /// Uploads the photo and stores the report.
    ///
    /// Fields are validated before the upload, so a rejected form never
    /// reaches the media host. If the insert fails after a successful upload
    /// the photo is deleted again on a best-effort basis.
    pub async fn create_item(
        &self,
        form: ItemForm,
        image: Option<ImageUpload>,
    ) -> AppResult<LostItem> {
        let image = image
            .filter(|image| !image.data.is_empty())
            .ok_or(AppError::MissingImage)?;

        let draft = form.validate()?;

        tracing::info!(
            "Creating item: name={}, item_type={}, image_size={}",
            draft.name,
            draft.item_type,
            image.data.len()
        );

        let media = self
            .media
            .upload(&image.data, &image.content_type)
            .await
            .map_err(|e| {
                tracing::error!("Media upload via {} failed: {}", self.media.name(), e);
                AppError::UploadFailed(e.to_string())
            })?;

        let public_id = media.public_id.clone();
        match self.items.insert(draft.with_media(media)).await {
            Ok(item) => Ok(item),
            Err(e) => {
                self.discard_media(&public_id).await;
                Err(e)
            }
        }
    }

    pub async fn list_items(&self) -> AppResult<Vec<LostItem>> {
        self.items.list_all().await
    }

    pub async fn get_item(&self, id: &str) -> AppResult<LostItem> {
        self.items.get_by_id(id).await
    }

    async fn discard_media(&self, public_id: &str) {
        match self.media.delete(public_id).await {
            Ok(()) => tracing::info!("Discarded orphaned media: public_id={}", public_id),
            Err(e) => tracing::warn!(
                "Failed to discard orphaned media: public_id={}, error={}",
                public_id,
                e
            ),
        }
    }
}
