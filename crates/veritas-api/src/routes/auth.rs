//! 인증 API 라우트.
//!
//! # 엔드포인트
//!
//! - `POST /auth/login` - 자격증명 검증 후 토큰 발급
//! - `POST /auth/signup` - 사용자 가입
//! - `GET /auth/me` - 현재 토큰의 사용자 정보 (게이트 적용)

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;
use veritas_core::{DomainError, SignUp};

use super::users::UserResponse;
use crate::auth::{require_auth, AuthUser};
use crate::error::{ApiError, ApiResult, ValidatedJson};
use crate::metrics::{record_login, record_token_issued};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// 가입 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "이름은 필수입니다"))]
    pub name: String,
    #[validate(email(message = "잘못된 이메일 형식입니다"))]
    pub email: String,
    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    pub password: String,
}

// ================================================================================================
// Handlers
// ================================================================================================

/// POST /auth/login
///
/// 실패 사유(이메일 없음/비밀번호 불일치)는 응답에서 구분되지 않습니다.
async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;

    let user = match state
        .credentials
        .verify(&request.email, &request.password)
        .await
    {
        Ok(user) => user,
        Err(err) => {
            if matches!(err, DomainError::AuthenticationFailure) {
                record_login("failure");
            } else {
                record_login("error");
            }
            return Err(err.into());
        }
    };

    let token = state.tokens.issue(&user.email)?;
    record_login("success");
    record_token_issued();
    info!(user_id = ?user.id, "User logged in");

    Ok(Json(LoginResponse { token }))
}

/// POST /auth/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let id = state
        .users
        .sign_up(SignUp {
            name: request.name.clone(),
            email: request.email.clone(),
            password: request.password,
        })
        .await?;

    debug!(%id, "Sign-up completed");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: Some(id),
            name: request.name,
            email: request.email,
        }),
    ))
}

/// GET /auth/me
async fn me(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<UserResponse>> {
    let record = state.users.find_by_email(&user.email).await?;
    Ok(Json(record.into()))
}

/// 인증 라우터 생성.
///
/// 접근 게이트는 `/me`에만 적용됩니다. 로그인과 가입은 토큰 없이 호출됩니다.
pub fn auth_router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .merge(protected)
}
