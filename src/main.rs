use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use lost_found::config::Config;
use lost_found::db::{create_pool, ItemStore, MemoryItemStore, PgItemStore};
use lost_found::routes::build_router;
use lost_found::services::ItemsService;
use lost_found::storage::{CloudinaryBackend, MediaStore, MemoryMediaStore};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lost_found=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Starting lost-found API server...");

    let items: Arc<dyn ItemStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection established");
            Arc::new(PgItemStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryItemStore::new())
        }
    };

    let media: Arc<dyn MediaStore> = match config.cloudinary.clone() {
        Some(cloudinary) => {
            tracing::info!(
                "Cloudinary storage enabled: cloud={}, folder={}",
                cloudinary.cloud_name,
                cloudinary.folder
            );
            Arc::new(CloudinaryBackend::new(cloudinary))
        }
        None => {
            tracing::warn!("Cloudinary credentials not set, photos are kept in memory only");
            Arc::new(MemoryMediaStore::new())
        }
    };

    let service = Arc::new(ItemsService::new(items, media));
    let app = build_router(service, &config);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("Invalid server address: {}", config.server_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
