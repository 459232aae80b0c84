//! 엔티티 저장소 추상화.
//!
//! 세 가지 엔티티 종류에 대해 하나의 제네릭 계약을 사용합니다.
//! 인메모리 구현은 이 크레이트에, PostgreSQL 구현은 API 크레이트에 있습니다.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::domain::{Entity, EntityId};
use crate::error::DomainResult;

/// 엔티티 영속성 계약.
///
/// 고유 키(이메일/이름) 충돌은 저장소가 `DomainError::Conflict`로 거부합니다.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// 엔티티를 저장하고 생성된 식별자를 반환합니다.
    ///
    /// 생성/수정 타임스탬프를 현재 시각으로 설정합니다.
    async fn create(&self, entity: E) -> DomainResult<EntityId>;

    /// 식별자로 조회합니다. 없으면 `NotFound`.
    async fn get(&self, id: EntityId) -> DomainResult<E>;

    /// 보조 키(사용자는 이메일, 역할/클레임은 이름)로 조회합니다.
    async fn get_by_key(&self, key: &str) -> DomainResult<E>;

    /// 변경 가능한 필드를 교체하고 `updated_at`을 갱신합니다.
    ///
    /// 존재 여부를 확인하지 않습니다: 없는 식별자에 대한 수정은 아무 일도 하지 않으며
    /// 전달된 엔티티를 그대로 돌려줍니다.
    async fn update(&self, id: EntityId, entity: E) -> DomainResult<E>;

    /// 삭제합니다. 없는 식별자는 에러가 아닙니다.
    async fn delete(&self, id: EntityId) -> DomainResult<()>;

    /// `created_at`, 식별자 순으로 정렬된 전체 목록.
    async fn list(&self) -> DomainResult<Vec<E>>;
}
