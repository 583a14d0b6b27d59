use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::cors_layer;
use crate::models::{ErrorResponse, ItemForm, ItemListResponse, ItemResponse};
use crate::services::health_service;
use crate::services::items_service::{ImageUpload, ItemsService};

/// Multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "image";

pub fn build_router(service: Arc<ItemsService>, config: &Config) -> Router {
    let items = Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_service::check))
        .nest("/api/items", items)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(config.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "Lost and Found API is running!" }))
}

async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Route not found")),
    )
}

async fn create_item(
    State(service): State<Arc<ItemsService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<ItemResponse>)> {
    // A body that is not multipart cannot carry a file.
    let multipart = multipart.map_err(|rejection| {
        tracing::debug!("Create request without multipart body: {}", rejection);
        AppError::MissingImage
    })?;

    let (form, image) = read_item_form(multipart).await?;
    let item = service.create_item(form, image).await?;

    Ok((StatusCode::CREATED, Json(ItemResponse::new(item))))
}

async fn list_items(State(service): State<Arc<ItemsService>>) -> AppResult<Json<ItemListResponse>> {
    let items = service.list_items().await?;
    Ok(Json(ItemListResponse::new(items)))
}

async fn get_item(
    State(service): State<Arc<ItemsService>>,
    Path(id): Path<String>,
) -> AppResult<Json<ItemResponse>> {
    let item = service.get_item(&id).await?;
    Ok(Json(ItemResponse::new(item)))
}

async fn read_item_form(mut multipart: Multipart) -> AppResult<(ItemForm, Option<ImageUpload>)> {
    let mut form = ItemForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            image = Some(ImageUpload { data, content_type });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if !form.set_field(&name, value) {
                tracing::debug!("Ignoring unknown form field: {}", name);
            }
        }
    }

    Ok((form, image))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::InvalidInput(err.body_text())
    }
}
