use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{LostItem, NewItem};

use super::ItemStore;

const ITEM_COLUMNS: &str = "id, name, description, image_url, media_id, location_found, \
     item_type, color, status, contact_info, contact_number, claimed_by, claimed_info, \
     claimed_number, ai_generated, ai_confidence, created_at, updated_at";

// SQLSTATE codes raised by the table's constraints
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";

pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_insert_error(err: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(db_err.code().as_deref(), Some(NOT_NULL_VIOLATION | CHECK_VIOLATION)) {
                return AppError::Validation(db_err.message().to_string());
            }
        }
        AppError::Database(err)
    }
}

#[async_trait::async_trait]
impl ItemStore for PgItemStore {
    async fn insert(&self, item: NewItem) -> AppResult<LostItem> {
        item.validate()?;

        let sql = format!(
            "INSERT INTO lost_items (name, description, image_url, media_id, location_found, \
             item_type, color, status, contact_info, contact_number, ai_generated, ai_confidence) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {}",
            ITEM_COLUMNS
        );

        let stored: LostItem = sqlx::query_as(&sql)
            .bind(&item.name)
            .bind(&item.description)
            .bind(&item.image_url)
            .bind(&item.media_id)
            .bind(&item.location_found)
            .bind(&item.item_type)
            .bind(&item.color)
            .bind(item.status.as_str())
            .bind(&item.contact_info)
            .bind(&item.contact_number)
            .bind(item.ai_generated)
            .bind(item.ai_confidence)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_insert_error)?;

        tracing::info!("Item stored: id={}, item_type={}", stored.id, stored.item_type);
        Ok(stored)
    }

    async fn list_all(&self) -> AppResult<Vec<LostItem>> {
        let sql = format!(
            "SELECT {} FROM lost_items ORDER BY created_at DESC",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, LostItem>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn get_by_id(&self, id: &str) -> AppResult<LostItem> {
        let id = Uuid::parse_str(id).map_err(|_| AppError::NotFound("Item not found".into()))?;

        let sql = format!("SELECT {} FROM lost_items WHERE id = $1", ITEM_COLUMNS);
        let item: Option<LostItem> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        item.ok_or_else(|| AppError::NotFound("Item not found".into()))
    }
}
