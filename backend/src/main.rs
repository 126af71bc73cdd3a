//! Backend entry-point: settings, persistence bootstrap and the HTTP server.

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use portfolio_backend::config::AppSettings;
use portfolio_backend::inbound::http::health::HealthState;
use portfolio_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use portfolio_backend::server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::from_env(&DefaultEnv::new()).wrap_err("invalid configuration")?;
    let mut config = ServerConfig::from_settings(&settings);
    if let Some(database_url) = settings.database_url.clone() {
        config = config.with_db_pool(connect(database_url, settings.db_pool_max_size).await?);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(portfolio_backend::server::metrics::prometheus(
        settings.enable_metrics,
    )?);
    #[cfg(not(feature = "metrics"))]
    if settings.enable_metrics {
        warn!("ENABLE_METRICS is set but this build lacks the `metrics` feature");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    health_state.mark_ready();
    info!(addr = %settings.bind_addr, "server listening");

    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}

/// Apply pending migrations, then open the connection pool.
async fn connect(database_url: String, max_size: u32) -> Result<DbPool> {
    let migrations_url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migrations_url))
        .await
        .wrap_err("migration task failed to complete")?
        .wrap_err("failed to apply database migrations")?;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(max_size))
        .await
        .wrap_err("failed to build database pool")?;
    let state = pool.state();
    info!(
        connections = state.connections,
        idle = state.idle,
        max_size,
        "database pool ready"
    );
    Ok(pool)
}
