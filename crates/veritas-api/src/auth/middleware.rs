//! 접근 게이트.
//!
//! 보호된 라우터에 `require_auth`를 적용하면 유효하고 만료되지 않은
//! Bearer 토큰이 없는 요청은 핸들러에 도달하기 전에 401로 거부됩니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use super::TokenError;
use crate::error::ApiErrorResponse;
use crate::metrics::record_auth_rejection;
use crate::state::AppState;

/// 게이트를 통과한 요청의 사용자.
///
/// ```rust,ignore
/// async fn handler(user: AuthUser) -> String {
///     format!("Authenticated user: {}", user.email)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

/// 게이트 거부 사유.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::TokenExpired => Self::TokenExpired,
            TokenError::InvalidToken | TokenError::Signing(_) => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        record_auth_rejection(self.code());

        let body = ApiErrorResponse::new(self.code(), self.to_string());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// `Authorization: Bearer <token>` 헤더에서 토큰을 꺼냅니다.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// 접근 게이트 미들웨어.
///
/// 토큰을 검증하고 성공하면 [`AuthUser`]를 요청 extension에 넣습니다.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = {
        let token = bearer_token(request.headers())?;
        state.tokens.validate(token).map_err(|e| {
            debug!(path = %request.uri().path(), error = %e, "Bearer token rejected");
            AuthError::from(e)
        })?
    };

    request
        .extensions_mut()
        .insert(AuthUser { email: claims.email });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        middleware,
        routing::get,
        Router,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use crate::state::create_test_state;

    async fn whoami(user: AuthUser) -> String {
        user.email
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/me");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn code_of(body: &str) -> String {
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        value["code"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_valid_token_passes_with_identity() {
        let state = Arc::new(create_test_state());
        let token = state.tokens.issue("alice@x.com").unwrap();

        let header = format!("Bearer {}", token);
        let (status, body) = call(app(state), Some(header.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice@x.com");
    }

    #[tokio::test]
    async fn test_rejections_carry_distinct_codes() {
        let state = Arc::new(create_test_state());
        let expired = state
            .tokens
            .issue_at("alice@x.com", Utc::now() - Duration::hours(48))
            .unwrap();
        let expired_header = format!("Bearer {}", expired);

        let cases = [
            (None, "MISSING_TOKEN"),
            (Some("Basic YWxpY2U6cHc="), "INVALID_AUTH_HEADER"),
            (Some("Bearer "), "INVALID_AUTH_HEADER"),
            (Some("Bearer garbage.token.value"), "INVALID_TOKEN"),
            (Some(expired_header.as_str()), "TOKEN_EXPIRED"),
        ];

        for (header, expected) in cases {
            let (status, body) = call(app(state.clone()), header).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", header);
            assert_eq!(code_of(&body), expected, "header {:?}", header);
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingToken));

        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Ok("abc.def.ghi"));

        headers.insert(AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Err(AuthError::InvalidAuthHeader));
    }
}
