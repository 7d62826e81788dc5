use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use marquee_api::{
    config::Config,
    db::{create_redis_client, Cache, CatalogStore, InMemoryCatalogStore, PgCatalogStore},
    middleware::auth::{USER_ID_HEADER, USER_ROLE_HEADER},
    routes::{create_router, AppState},
    services::OpenAiClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,marquee_api=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn CatalogStore> = match &config.database_url {
        Some(url) => Arc::new(PgCatalogStore::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, using an in-memory catalog");
            Arc::new(InMemoryCatalogStore::new())
        }
    };

    let (cache, cache_writer) = match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?).await;
            (Some(cache), Some(handle))
        }
        None => (None, None),
    };

    let completion = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        config.openai_model.clone(),
    );
    if !completion.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set, recommendations use the genre heuristic only");
    }

    tracing::info!(
        store = store.name(),
        cache = cache.is_some(),
        model = %config.openai_model,
        "Catalog services initialized"
    );

    let state = AppState::new(store, Arc::new(completion), cache, config.video_dir.clone());
    let app = create_router(state).layer(cors_layer(&config)?);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins = config
        .cors_origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
