//! 역할/클레임 API 라우트.
//!
//! 두 종류는 같은 형태(이름, 설명)이므로 하나의 제네릭 핸들러 집합을 공유합니다.
//!
//! # 엔드포인트 (`/roles`, `/claims` 공통)
//!
//! - `POST /` - 생성 → 201 `{id}`
//! - `GET /` - 목록
//! - `GET /{id}` - 조회
//! - `PUT /{id}` - 부분 수정 → `{id}`
//! - `DELETE /{id}` - 삭제

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use veritas_core::{
    Claim, ClaimDraft, ClaimPatch, Entity, EntityId, EntityService, Role, RoleDraft, RolePatch,
};

use super::MessageResponse;
use crate::error::{empty_as_none, ApiResult, ValidatedJson};
use crate::state::AppState;

/// 이름/설명으로 관리되는 엔티티.
pub trait CatalogEntity: Entity + Serialize {
    /// 응답 메시지에 쓰이는 표시 이름
    const LABEL: &'static str;

    fn service(state: &AppState) -> &EntityService<Self>;

    fn draft(name: String, description: String) -> Self::Draft;

    fn patch(name: Option<String>, description: Option<String>) -> Self::Patch;
}

impl CatalogEntity for Role {
    const LABEL: &'static str = "역할";

    fn service(state: &AppState) -> &EntityService<Self> {
        &state.roles
    }

    fn draft(name: String, description: String) -> RoleDraft {
        RoleDraft { name, description }
    }

    fn patch(name: Option<String>, description: Option<String>) -> RolePatch {
        RolePatch { name, description }
    }
}

impl CatalogEntity for Claim {
    const LABEL: &'static str = "클레임";

    fn service(state: &AppState) -> &EntityService<Self> {
        &state.claims
    }

    fn draft(name: String, description: String) -> ClaimDraft {
        ClaimDraft { name, description }
    }

    fn patch(name: Option<String>, description: Option<String>) -> ClaimPatch {
        ClaimPatch { name, description }
    }
}

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 생성 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCatalogRequest {
    #[validate(length(min = 1, message = "이름은 필수입니다"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// 부분 수정 요청. 비어 있는 필드는 기존 값을 유지합니다.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCatalogRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
}

/// 식별자만 담은 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: EntityId,
}

// ================================================================================================
// Handlers
// ================================================================================================

async fn create_entry<E: CatalogEntity>(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateCatalogRequest>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let id = E::service(&state)
        .create(E::draft(request.name, request.description))
        .await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

async fn list_entries<E: CatalogEntity>(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<E>>> {
    Ok(Json(E::service(&state).list().await?))
}

async fn get_entry<E: CatalogEntity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<E>> {
    Ok(Json(E::service(&state).read(&id).await?))
}

async fn update_entry<E: CatalogEntity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateCatalogRequest>,
) -> ApiResult<Json<IdResponse>> {
    let entity_id = EntityId::parse(&id)?;
    E::service(&state)
        .update(&id, E::patch(request.name, request.description))
        .await?;

    Ok(Json(IdResponse { id: entity_id }))
}

async fn delete_entry<E: CatalogEntity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    E::service(&state).delete(&id).await?;
    Ok(Json(MessageResponse::new(format!("{}이(가) 삭제되었습니다", E::LABEL))))
}

/// 역할/클레임 라우터 생성.
pub fn catalog_router<E: CatalogEntity>() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_entries::<E>).post(create_entry::<E>))
        .route(
            "/{id}",
            get(get_entry::<E>)
                .put(update_entry::<E>)
                .delete(delete_entry::<E>),
        )
}

pub fn roles_router() -> Router<Arc<AppState>> {
    catalog_router::<Role>()
}

pub fn claims_router() -> Router<Arc<AppState>> {
    catalog_router::<Claim>()
}
