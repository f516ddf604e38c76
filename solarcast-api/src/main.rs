//! # SolarCast API Server
//!
//! HTTP backend for the SolarCast dashboard: account signup and login, a
//! small user directory, and a weather proxy in front of weatherapi.com.
//!
//! ## Storage
//!
//! With `DATABASE_URL` set the server connects to PostgreSQL and applies the
//! embedded migrations before accepting traffic. Without it users are kept
//! in memory and lost on restart.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=... WEATHER_API_KEY=... cargo run -p solarcast-api
//! ```

use solarcast_api::app::{build_router, AppState};
use solarcast_api::config::{Config, LogFormat};
use solarcast_shared::db::{migrations, pool};
use solarcast_shared::store::{memory::InMemoryUserStore, postgres::PgUserStore, UserStore};
use solarcast_shared::weather::{WeatherApiClient, WeatherApiConfig, WeatherService};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "SolarCast API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let postgres = match &config.database {
        Some(database) => {
            pool::create_pool(pool::DatabaseConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                ..Default::default()
            })
            .await
            .map(|pool| Some(PgUserStore::new(pool)))?
        }
        None => {
            tracing::warn!("DATABASE_URL not set; users are kept in memory");
            None
        }
    };

    if let Some(store) = &postgres {
        migrations::run_migrations(store.pool()).await?;
    }

    let users: Arc<dyn UserStore> = match &postgres {
        Some(store) => Arc::new(store.clone()),
        None => Arc::new(InMemoryUserStore::new()),
    };

    let weather_client = WeatherApiClient::new(WeatherApiConfig {
        api_key: config.weather.api_key.clone(),
        base_url: config.weather.base_url.clone(),
        timeout_seconds: config.weather.timeout_seconds,
    })?;
    let weather = WeatherService::new(Arc::new(weather_client));

    let bind_address = config.bind_address();
    tracing::info!(
        storage = users.backend(),
        weather_base_url = %config.weather.base_url,
        token_ttl_hours = ?config.jwt.ttl_hours,
        "Configuration loaded"
    );

    let app = build_router(AppState::new(users, weather, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = postgres {
        pool::close_pool(store.pool().clone()).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Installs the global subscriber; `RUST_LOG` overrides the default filter
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "solarcast_api=debug,solarcast_shared=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
