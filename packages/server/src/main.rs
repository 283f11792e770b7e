use std::sync::Arc;

use anyhow::Context;
use common::FilesystemMediaStore;
use tracing::info;

use server::config::AppConfig;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let db = server::database::init_db(&config.database)
        .await
        .context("connecting to database")?;
    server::seed::ensure_indexes(&db).await?;
    server::seed::seed_from_config(&db, &config.seed).await?;

    let media = FilesystemMediaStore::new(config.media.root.clone(), config.media.max_image_size)
        .await
        .context("initializing media store")?;
    info!("Serving media from {}", config.media.root.display());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        media: Arc::new(media),
    };

    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Foodgram server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
