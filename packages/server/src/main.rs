use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemPictureStore;
use tracing::{Level, info};

use grams_server::config::AppConfig;
use grams_server::database::init_db;
use grams_server::identity::SessionIdentityProvider;
use grams_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database schema synced");

    let pictures = FilesystemPictureStore::new(
        config.storage.picture_dir.clone(),
        config.storage.max_picture_size,
    )
    .await
    .context("Failed to open picture store")?;
    info!(dir = %config.storage.picture_dir.display(), "Picture store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        pictures: Arc::new(pictures),
        identity: Arc::new(SessionIdentityProvider::new(config.auth.jwt_secret.clone())),
        config,
    };

    let app = grams_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/scalar", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
