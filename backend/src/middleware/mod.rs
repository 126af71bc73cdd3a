//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such
//! as tracing and rate limiting.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::{RateLimit, RateLimiter};
pub use trace::Trace;
