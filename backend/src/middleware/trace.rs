//! Request correlation and access logging.
//!
//! Every request runs inside a [`TraceId`] scope. A UUID supplied in the
//! `trace-id` request header is kept so ids survive a proxy hop; anything
//! else is replaced. The id is echoed on the response and one access line is
//! logged per request: `error` for 5xx, `debug` for health probes and
//! `info` otherwise.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Level, debug, error, info};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware scoping each request to a [`TraceId`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use portfolio_backend::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

pub struct TraceMiddleware<S> {
    service: S,
}

/// Fields of the access line emitted once the response is known.
struct Access {
    trace_id: TraceId,
    method: String,
    path: String,
    started: Instant,
}

impl Access {
    fn level(&self, status: StatusCode) -> Level {
        if status.is_server_error() {
            Level::ERROR
        } else if self.path.starts_with("/health/") {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    fn log(&self, status: StatusCode) {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status_code = status.as_u16();
        let Self {
            trace_id,
            method,
            path,
            ..
        } = self;
        let level = self.level(status);
        if level == Level::ERROR {
            error!(%trace_id, %method, %path, status = status_code, elapsed_ms, "request failed");
        } else if level == Level::DEBUG {
            debug!(%trace_id, %method, %path, status = status_code, elapsed_ms, "probe answered");
        } else {
            info!(%trace_id, %method, %path, status = status_code, elapsed_ms, "request handled");
        }
    }
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let upstream = req
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        let access = Access {
            trace_id: TraceId::inherit_or_generate(upstream),
            method: req.method().to_string(),
            path: req.path().to_owned(),
            started: Instant::now(),
        };
        let trace_id = access.trace_id;
        let fut = self.service.call(req);
        Box::pin(trace_id.scope(async move {
            let mut res = fut.await?;
            if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
                res.headers_mut()
                    .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
            }
            access.log(res.status());
            Ok(res)
        }))
    }
}
