// Record store abstraction for Postgres and in-process backends

pub mod items;
pub mod memory;
pub mod pool;

pub use items::PgItemStore;
pub use memory::MemoryItemStore;
pub use pool::create_pool;

use crate::error::AppResult;
use crate::models::{LostItem, NewItem};

/// Persistent collection of lost-item reports.
#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// Validates and stores a record, assigning its id and timestamps.
    async fn insert(&self, item: NewItem) -> AppResult<LostItem>;

    /// Every record, newest first.
    async fn list_all(&self) -> AppResult<Vec<LostItem>>;

    /// One record by id. Unknown or malformed ids are `NotFound`.
    async fn get_by_id(&self, id: &str) -> AppResult<LostItem>;
}
