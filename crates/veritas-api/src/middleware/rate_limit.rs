//! Rate limiting middleware.
//!
//! 클라이언트 IP별 Token Bucket으로 `/auth/*` 요청(로그인/가입)을 제한합니다.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use tokio::sync::RwLock;
use veritas_core::RateLimitSettings;

use crate::error::ApiErrorResponse;

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 순간적으로 허용되는 추가 요청 수
    pub burst_size: u32,
    /// 이 시간 동안 요청이 없던 버킷은 정리 대상
    pub idle_ttl: Duration,
    /// 프록시 헤더(`X-Forwarded-For`, `X-Real-IP`)를 클라이언트 주소로 사용
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from(&RateLimitSettings::default())
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            requests_per_minute: settings.requests_per_minute.max(1),
            burst_size: settings.burst_size,
            idle_ttl: Duration::from_secs(300),
            trust_proxy_headers: settings.trust_proxy_headers,
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    capacity: f64,
    /// 초당 리필 토큰 수
    refill_rate: f64,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let refill_rate = config.requests_per_minute as f64 / 60.0;
        let capacity = refill_rate.max(1.0) + config.burst_size as f64;

        Self {
            tokens: capacity,
            last_refill: Instant::now(),
            capacity,
            refill_rate,
        }
    }

    fn try_acquire(&mut self) -> Result<(), u64> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let wait = (1.0 - self.tokens) / self.refill_rate;
            Err(wait.ceil().max(1.0) as u64)
        }
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited {
        /// 재시도까지 대기 시간 (초)
        retry_after: u64,
    },
}

/// IP 주소별 Rate Limiter.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<IpAddr, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(&self.config));

        match bucket.try_acquire() {
            Ok(()) => RateLimitResult::Allowed,
            Err(retry_after) => RateLimitResult::Limited { retry_after },
        }
    }

    /// 오래 사용되지 않은 버킷을 정리합니다.
    pub async fn cleanup(&self) {
        let idle_ttl = self.config.idle_ttl;
        self.buckets
            .write()
            .await
            .retain(|_, bucket| bucket.last_refill.elapsed() < idle_ttl);
    }

    pub fn trusts_proxy_headers(&self) -> bool {
        self.config.trust_proxy_headers
    }

    pub async fn tracked_ips(&self) -> usize {
        self.buckets.read().await.len()
    }
}

/// Rate Limit 미들웨어 상태.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: RateLimiter,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// 클라이언트 IP별 Rate Limiting 미들웨어.
///
/// 초과 시 429와 `Retry-After` 헤더를 반환합니다.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = extract_client_ip(&request, state.limiter.trusts_proxy_headers());

    match state.limiter.check(ip).await {
        RateLimitResult::Allowed => {
            counter!("rate_limit_requests_total", "status" => "allowed").increment(1);
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            counter!("rate_limit_requests_total", "status" => "limited").increment(1);
            tracing::warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let body = ApiErrorResponse::new(
                "RATE_LIMITED",
                "요청 한도를 초과했습니다. 잠시 후 다시 시도하세요.",
            )
            .with_details(serde_json::json!({ "retry_after": retry_after }));

            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

/// 요청에서 클라이언트 IP를 추출합니다.
///
/// 기본은 연결 정보(`ConnectInfo`)의 주소입니다. `trust_proxy_headers`가 켜져 있으면
/// `X-Forwarded-For`(첫 번째 값), `X-Real-IP`를 먼저 확인합니다.
/// 모두 없으면 루프백 주소를 사용합니다.
pub fn extract_client_ip(request: &Request, trust_proxy_headers: bool) -> IpAddr {
    let header_ip = |name: &str| -> Option<IpAddr> {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse().ok())
    };

    let forwarded = if trust_proxy_headers {
        header_ip("x-forwarded-for").or_else(|| header_ip("x-real-ip"))
    } else {
        None
    };

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn config(requests_per_minute: u32, burst_size: u32) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute,
            burst_size,
            idle_ttl: Duration::from_secs(60),
            trust_proxy_headers: false,
        }
    }

    #[tokio::test]
    async fn test_burst_then_limited() {
        let limiter = RateLimiter::new(config(60, 5));
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        // 초당 1 + 버스트 5
        for i in 0..6 {
            assert_eq!(
                limiter.check(ip).await,
                RateLimitResult::Allowed,
                "request {} should pass",
                i
            );
        }
        assert!(matches!(
            limiter.check(ip).await,
            RateLimitResult::Limited { retry_after } if retry_after >= 1
        ));
    }

    #[tokio::test]
    async fn test_buckets_are_per_ip() {
        let limiter = RateLimiter::new(config(60, 0));
        let first: IpAddr = "10.0.0.1".parse().unwrap();
        let second: IpAddr = "10.0.0.2".parse().unwrap();

        assert_eq!(limiter.check(first).await, RateLimitResult::Allowed);
        assert_ne!(limiter.check(first).await, RateLimitResult::Allowed);
        assert_eq!(limiter.check(second).await, RateLimitResult::Allowed);
        assert_eq!(limiter.tracked_ips().await, 2);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_buckets() {
        let limiter = RateLimiter::new(RateLimitConfig {
            idle_ttl: Duration::from_millis(10),
            ..config(60, 0)
        });
        let _ = limiter.check("10.0.0.1".parse().unwrap()).await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips().await, 0);
    }

    #[tokio::test]
    async fn test_middleware_returns_429_with_retry_after() {
        let state = RateLimitState::new(config(60, 0));
        let app = Router::new()
            .route("/auth/login", post(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, rate_limit_middleware));

        let request = || {
            axum::http::Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_rotating_forwarded_header_shares_bucket() {
        let state = RateLimitState::new(config(1, 0));
        let app = Router::new()
            .route("/auth/login", post(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, rate_limit_middleware));

        let mut allowed = 0;
        for i in 0..20 {
            let mut request = axum::http::Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("x-forwarded-for", format!("203.0.113.{}", i))
                .body(Body::empty())
                .unwrap();
            request
                .extensions_mut()
                .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 10], 40000 + i))));

            if app.clone().oneshot(request).await.unwrap().status() == StatusCode::OK {
                allowed += 1;
            }
        }

        // 같은 연결 주소이므로 헤더를 바꿔도 하나의 버킷
        assert_eq!(allowed, 1);
    }

    #[test]
    fn test_extract_client_ip_ignores_headers_by_default() {
        let mut request = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 10], 5555))));

        assert_eq!(
            extract_client_ip(&request, false),
            "192.0.2.10".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            extract_client_ip(&request, true),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_extract_client_ip_precedence_behind_proxy() {
        let request = axum::http::Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_client_ip(&request, true),
            "198.51.100.2".parse::<IpAddr>().unwrap()
        );

        let bare = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_client_ip(&bare, true), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
