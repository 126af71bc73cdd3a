//! Prometheus request metrics behind the `metrics` feature.
//!
//! [`prometheus`] builds the collector, or nothing when `ENABLE_METRICS` is
//! off. [`MetricsLayer`] wraps either outcome so the application type does
//! not depend on the runtime flag.

use std::sync::Arc;

use actix_service::boxed::{self, BoxService};
use actix_service::{Service, ServiceExt as _, Transform};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use prometheus::Registry;

/// Metric name prefix.
pub const NAMESPACE: &str = "portfolio";
/// Path serving the text exposition format.
pub const ENDPOINT: &str = "/metrics";

/// The collector could not be registered.
#[derive(Debug, thiserror::Error)]
#[error("configure Prometheus metrics: {0}")]
pub struct MetricsSetupError(String);

/// Build the request collector when `enabled`.
///
/// Each collector owns a fresh registry so several applications can live in
/// one process. Health probes are not counted.
///
/// # Errors
/// Returns [`MetricsSetupError`] when the collectors fail to register.
pub fn prometheus(enabled: bool) -> Result<Option<PrometheusMetrics>, MetricsSetupError> {
    if !enabled {
        return Ok(None);
    }
    PrometheusMetricsBuilder::new(NAMESPACE)
        .registry(Registry::new())
        .endpoint(ENDPOINT)
        .exclude("/health/ready")
        .exclude("/health/live")
        .build()
        .map(Some)
        .map_err(|err| MetricsSetupError(err.to_string()))
}

/// Middleware that records metrics when a collector is present and only
/// boxes the body otherwise.
#[derive(Clone)]
pub(crate) struct MetricsLayer {
    collector: Option<Arc<PrometheusMetrics>>,
}

impl MetricsLayer {
    pub(crate) fn new(collector: Option<PrometheusMetrics>) -> Self {
        Self {
            collector: collector.map(Arc::new),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(collector) = self.collector.clone() else {
            let passthrough = service.map(ServiceResponse::map_into_boxed_body);
            return Box::pin(async move { Ok(boxed::service(passthrough)) });
        };
        let pending = Compat::new((*collector).clone()).new_transform(service);
        Box::pin(async move { Ok(boxed::service(pending.await?)) })
    }
}
