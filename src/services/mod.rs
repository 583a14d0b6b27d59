pub mod health_service;
pub mod items_service;

pub use health_service::HealthCheckResponse;
pub use items_service::{ImageUpload, ItemsService};
