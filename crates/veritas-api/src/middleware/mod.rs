//! API 서버용 HTTP middleware.

mod metrics;
mod rate_limit;

pub use metrics::metrics_layer;
pub use rate_limit::{
    extract_client_ip, rate_limit_middleware, RateLimitConfig, RateLimitResult, RateLimitState,
    RateLimiter,
};
