use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{LostItem, NewItem};

use super::ItemStore;

/// In-process record store. Used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<LostItem>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ItemStore for MemoryItemStore {
    async fn insert(&self, item: NewItem) -> AppResult<LostItem> {
        item.validate()?;

        let stored = item.into_item(Uuid::new_v4(), Utc::now());
        self.items.write().await.push(stored.clone());
        tracing::debug!("Item stored in memory: id={}", stored.id);
        Ok(stored)
    }

    async fn list_all(&self) -> AppResult<Vec<LostItem>> {
        // Reverse insertion order first so equal timestamps keep the later insert on top.
        let mut items: Vec<LostItem> = self.items.read().await.iter().rev().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn get_by_id(&self, id: &str) -> AppResult<LostItem> {
        let id = Uuid::parse_str(id).map_err(|_| AppError::NotFound("Item not found".into()))?;
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Item not found".into()))
    }
}
