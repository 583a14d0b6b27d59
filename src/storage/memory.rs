use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::DEFAULT_MEDIA_FOLDER;
use crate::error::{AppError, AppResult};
use crate::models::UploadedMedia;

use super::MediaStore;

/// Keeps uploads in process memory. Used when no media host is configured, and by tests.
#[derive(Default)]
pub struct MemoryMediaStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    fail_uploads: AtomicBool,
    upload_calls: AtomicUsize,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following upload fail, as an unreachable host would.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Number of upload attempts, failed ones included.
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.objects.read().await.contains_key(public_id)
    }

    pub async fn get(&self, public_id: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(public_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(&self, data: &[u8], content_type: &str) -> AppResult<UploadedMedia> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Storage("Media host unavailable".to_string()));
        }
        if data.is_empty() {
            return Err(AppError::Storage("No image data provided".to_string()));
        }

        let public_id = format!("{}/{}", DEFAULT_MEDIA_FOLDER, Uuid::new_v4().simple());
        self.objects
            .write()
            .await
            .insert(public_id.clone(), data.to_vec());

        tracing::debug!(
            "Memory upload: public_id={}, content_type={}, size={}",
            public_id,
            content_type,
            data.len()
        );
        Ok(UploadedMedia {
            url: format!("memory://{}", public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        match self.objects.write().await.remove(public_id) {
            Some(_) => Ok(()),
            None => Err(AppError::Storage(format!("Unknown media id: {}", public_id))),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_and_delete() {
        let store = MemoryMediaStore::new();
        let media = store.upload(b"jpeg bytes", "image/jpeg").await.unwrap();

        assert!(media.public_id.starts_with("lost-found/"));
        assert_eq!(media.url, format!("memory://{}", media.public_id));
        assert!(store.contains(&media.public_id).await);

        store.delete(&media.public_id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(store.delete(&media.public_id).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let store = MemoryMediaStore::new();
        store.fail_uploads(true);

        assert!(store.upload(b"jpeg bytes", "image/jpeg").await.is_err());
        assert_eq!(store.upload_calls(), 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let store = MemoryMediaStore::new();
        assert!(matches!(
            store.upload(&[], "image/jpeg").await,
            Err(AppError::Storage(_))
        ));
    }
}
