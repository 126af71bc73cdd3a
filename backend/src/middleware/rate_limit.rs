//! Fixed-window, per-client-IP rate limiting for public reads.
//!
//! Only `GET` and `HEAD` requests are counted. A client that exhausts its
//! budget receives `429` with a `retry-after` header naming the seconds left
//! in the current window. Mutating requests pass straight through; they are
//! already gated by authentication.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header::{HeaderValue, RETRY_AFTER};
use actix_web::{Error, ResponseError};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::{Clock, DefaultClock};
use tracing::debug;

use crate::domain::Error as DomainError;

const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

/// Counter state shared by every worker.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    /// Allow `limit` reads per client per minute. Zero disables limiting.
    pub fn per_minute(limit: u32) -> Self {
        Self::with_clock(limit, Duration::minutes(1), Arc::new(DefaultClock))
    }

    /// Build a limiter over an explicit window and clock.
    pub fn with_clock(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            window,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Whether limiting is active at all.
    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Record one request from `client`.
    ///
    /// Returns the whole seconds until the window resets when the budget is
    /// spent.
    pub fn check(&self, client: IpAddr) -> Result<(), u64> {
        if !self.is_enabled() {
            return Ok(());
        }
        let now = self.clock.utc();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, entry| now - entry.started < window);
        }

        let entry = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now - entry.started >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        if entry.count >= self.limit {
            let remaining = (entry.started + self.window - now).num_milliseconds();
            let seconds = u64::try_from(remaining.saturating_add(999) / 1000).unwrap_or(1);
            return Err(seconds.max(1));
        }
        entry.count += 1;
        Ok(())
    }
}

/// Middleware applying a shared [`RateLimiter`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use portfolio_backend::middleware::{RateLimit, RateLimiter};
///
/// let limiter = Arc::new(RateLimiter::per_minute(60));
/// let app = App::new().service(web::scope("/projects").wrap(RateLimit::new(limiter)));
/// ```
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<RateLimiter>,
}

fn client_ip(req: &ServiceRequest) -> IpAddr {
    req.peer_addr()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |addr| addr.ip())
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let counted = matches!(*req.method(), Method::GET | Method::HEAD);
        if counted {
            let client = client_ip(&req);
            if let Err(retry_after) = self.limiter.check(client) {
                return Box::pin(async move {
                    debug!(%client, retry_after, "rate limit exceeded");
                    let error = DomainError::too_many_requests("too many requests");
                    let mut response = error.error_response();
                    response
                        .headers_mut()
                        .insert(RETRY_AFTER, HeaderValue::from(retry_after));
                    Ok(req.into_response(response).map_into_right_body())
                });
            }
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
