//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth` - 로그인, 가입, 현재 사용자 (Rate Limit 적용)
//! - `/users` - 사용자 관리 (게이트)
//! - `/roles` - 역할 관리 (게이트)
//! - `/claims` - 클레임 관리 (게이트)

pub mod auth;
pub mod catalog;
pub mod health;
pub mod users;

pub use auth::{auth_router, LoginRequest, LoginResponse, SignupRequest};
pub use catalog::{
    catalog_router, claims_router, roles_router, CatalogEntity, CreateCatalogRequest, IdResponse,
    UpdateCatalogRequest,
};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use users::{users_router, UpdateUserRequest, UserResponse};

use std::sync::Arc;

use axum::{middleware, Router};
use serde::{Deserialize, Serialize};

use crate::auth::require_auth;
use crate::middleware::{rate_limit_middleware, RateLimitState};
use crate::state::AppState;

/// 단순 메시지 응답 (삭제 등).
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 전체 API 라우터 생성.
///
/// `rate_limit`이 주어지면 `/auth` 하위 경로에만 적용합니다.
pub fn create_api_router(
    state: &Arc<AppState>,
    rate_limit: Option<RateLimitState>,
) -> Router<Arc<AppState>> {
    let auth = match rate_limit {
        Some(limiter) => auth_router(state).layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        )),
        None => auth_router(state),
    };

    // 접근 게이트 뒤의 라우트
    let protected = Router::new()
        .nest("/users", users_router())
        .nest("/roles", roles_router())
        .nest("/claims", claims_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth)
        .merge(protected)
}
