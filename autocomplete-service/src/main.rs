use autocomplete_service::api_client::WeatherApiClient;
use autocomplete_service::autocomplete::AutocompleteService;
use autocomplete_service::cache::RedisCache;
use autocomplete_service::config::Config;
use autocomplete_service::db::{self, PgCityStore};
use autocomplete_service::{create_router, handlers};
use common::tracing::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

const DEFAULT_LOG_DIRECTIVES: &str = "info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    init_tracing(config.log_format, DEFAULT_LOG_DIRECTIVES);

    let pool = db::create_pool(&config.database_url).await?;

    let cache = Arc::new(RedisCache::connect(&config.redis_url).await?);
    let store = Arc::new(PgCityStore::new(pool));
    let lookup = Arc::new(WeatherApiClient::new(
        &config.weather_api_base_url,
        config.weather_api_key.clone(),
        config.http_timeout_secs,
    )?);
    let service = Arc::new(AutocompleteService::new(
        cache,
        store,
        lookup,
        config.cache_ttl,
    ));

    let app = create_router(handlers::AppState { service });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Autocomplete service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Autocomplete service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }

    warn!("Shutting down gracefully...");
}
