//! 사용자 API 라우트.
//!
//! # 엔드포인트
//!
//! - `GET /users` - 사용자 목록
//! - `GET /users/{id}` - 사용자 조회
//! - `PUT /users/{id}` - 부분 수정 (비어 있는 필드는 유지)
//! - `DELETE /users/{id}` - 삭제
//!
//! 모든 엔드포인트는 접근 게이트 뒤에 있습니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;
use veritas_core::{EntityId, User, UserUpdate};

use super::MessageResponse;
use crate::error::{empty_as_none, ApiResult, ValidatedJson};
use crate::state::AppState;

/// 외부로 노출되는 사용자 정보. 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Option<EntityId>,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.username,
            email: user.email,
        }
    }
}

/// 사용자 부분 수정 요청.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "잘못된 이메일 형식입니다"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    pub password: Option<String>,
}

/// GET /users
async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/{id}
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.users.read(&id).await?.into()))
}

/// PUT /users/{id}
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users
        .update(
            &id,
            UserUpdate {
                name: request.name,
                email: request.email,
                password: request.password,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /users/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.delete(&id).await?;
    info!(user_id = %id, "User deleted");
    Ok(Json(MessageResponse::new("사용자가 삭제되었습니다")))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_treats_empty_as_absent() {
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"name": "", "email": "new@x.com"}"#).unwrap();

        assert_eq!(request.name, None);
        assert_eq!(request.email.as_deref(), Some("new@x.com"));
        assert_eq!(request.password, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_validates_present_fields_only() {
        let bad_email: UpdateUserRequest =
            serde_json::from_str(r#"{"email": "nope"}"#).unwrap();
        assert!(bad_email.validate().is_err());

        let short_password: UpdateUserRequest =
            serde_json::from_str(r#"{"password": "short"}"#).unwrap();
        assert!(short_password.validate().is_err());

        assert!(UpdateUserRequest::default().validate().is_ok());
    }

    #[test]
    fn test_user_response_hides_hash() {
        let user = User {
            id: Some(EntityId::generate()),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: veritas_core::now(),
            updated_at: veritas_core::now(),
        };

        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(json.contains("\"name\":\"alice\""));
        assert!(!json.contains("argon2"));
    }
}
