use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinesuggest_api::{
    config::{Config, StoreBackend},
    routes::{create_router, AppState, StateTimings},
    services::providers::{gemini::GeminiClient, tmdb::TmdbClient},
    store::{KeyValueStore, MemoryStore, RedisStore, ResponseCache},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinesuggest_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    let store: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(&config.redis_url)
                .await
                .context("Failed to connect to Redis")?,
        ),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    let (cache, cache_handle) = ResponseCache::new(store.clone());
    let catalog = Arc::new(TmdbClient::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_language.clone(),
    ));
    let recommender = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_api_url.clone(),
        config.gemini_model.clone(),
    ));

    let state = AppState::new(store, catalog, recommender, StateTimings::from(&config))
        .await
        .context("Failed to initialize application state")?;
    let app = create_router(Arc::new(state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    cache_handle.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
