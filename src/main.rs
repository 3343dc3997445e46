//! Storefront Catalog - product catalog and message-based checkout service

use std::sync::Arc;

use anyhow::{Context, Result};
use storefront_catalog::{
    config::{Backend, LogFormat},
    http::{router, AppState},
    images::{CloudinaryUploader, DisabledUploader, ImageUploader},
    publisher::EventPublisher,
    store::{MemoryProductStore, PgProductStore, ProductStore},
    Config, ProductCatalog,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);

    let store: Arc<dyn ProductStore> = match config.backend {
        Backend::Postgres => {
            let url = config.database_url.as_ref().context("DATABASE_URL is required")?;
            let store = PgProductStore::connect(url, config.database_max_connections).await.context("database connection failed")?;
            store.migrate().await.context("database migration failed")?;
            Arc::new(store)
        }
        Backend::Memory => {
            tracing::warn!("using in-memory product store, data is lost on restart");
            Arc::new(MemoryProductStore::new())
        }
    };

    let images: Arc<dyn ImageUploader> = match &config.cloudinary {
        Some(c) => Arc::new(CloudinaryUploader::new(&c.cloud_name, c.upload_preset.clone(), c.folder.clone())),
        None => {
            tracing::warn!("image hosting not configured, uploads will be rejected");
            Arc::new(DisabledUploader)
        }
    };

    let events = match &config.nats_url {
        Some(url) => EventPublisher::connect(url).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "NATS unavailable, catalog events disabled");
            EventPublisher::disabled()
        }),
        None => EventPublisher::disabled(),
    };

    let addr = config.socket_addr();
    let catalog = ProductCatalog::new(store, images, events, config.max_image_bytes);
    let app = router(AppState { catalog, config: Arc::new(config) });

    tracing::info!(%addr, "storefront catalog listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
