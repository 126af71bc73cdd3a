//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use chrono::Duration;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use crate::config::AppSettings;
use crate::inbound::http::projects::TitleKey;
use crate::outbound::persistence::DbPool;

const DEFAULT_RATE_LIMIT: u32 = 60;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) title_key: TitleKey,
    pub(crate) access_token_ttl: Option<Duration>,
    pub(crate) rate_limit_per_minute: u32,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration with the in-memory store and default policies.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            title_key: TitleKey::default(),
            access_token_ttl: None,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Copy the server-facing parts of parsed settings.
    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.bind_addr)
            .with_title_key(settings.title_key)
            .with_access_token_ttl(settings.access_token_ttl)
            .with_rate_limit(settings.rate_limit_per_minute)
    }

    /// Use PostgreSQL-backed repositories instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_title_key(mut self, title_key: TitleKey) -> Self {
        self.title_key = title_key;
        self
    }

    /// Expire issued tokens after `ttl`; `None` keeps them until logout.
    #[must_use]
    pub fn with_access_token_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Public reads allowed per client per minute. Zero disables limiting.
    #[must_use]
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }

    #[cfg(feature = "metrics")]
    /// Return the configured Prometheus middleware, if any.
    #[must_use]
    pub fn metrics(&self) -> Option<&PrometheusMetrics> {
        self.prometheus.as_ref()
    }
}
