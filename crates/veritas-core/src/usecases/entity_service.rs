//! 제네릭 엔티티 유스케이스.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{now, Claim, Entity, EntityId, Role};
use crate::error::DomainResult;
use crate::store::EntityStore;

/// 역할 유스케이스.
pub type RoleService = EntityService<Role>;

/// 클레임 유스케이스.
pub type ClaimService = EntityService<Claim>;

/// 엔티티 한 종류에 대한 생성/조회/부분 수정/삭제/목록.
pub struct EntityService<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(store: Arc<dyn EntityStore<E>>) -> Self {
        Self { store }
    }

    /// 엔티티를 생성합니다.
    ///
    /// 고유성 사전 확인은 하지 않습니다. 충돌은 저장소가 `Conflict`로 보고합니다.
    pub async fn create(&self, draft: E::Draft) -> DomainResult<EntityId> {
        let entity = E::from_draft(draft, now());
        entity.validate()?;

        let id = self.store.create(entity).await?;
        info!(kind = E::KIND, %id, "Entity created");
        Ok(id)
    }

    /// 식별자 문자열로 조회합니다.
    ///
    /// 식별자 파싱은 저장소 접근 전에 이루어집니다.
    pub async fn read(&self, id: &str) -> DomainResult<E> {
        let id = EntityId::parse(id)?;
        self.store.get(id).await
    }

    /// 부분 수정.
    ///
    /// 비어 있지 않은 필드만 덮어쓰고 `updated_at`을 갱신한 뒤 병합된 레코드를 반환합니다.
    /// 동시 수정은 마지막 쓰기가 이깁니다.
    pub async fn update(&self, id: &str, patch: E::Patch) -> DomainResult<E> {
        let id = EntityId::parse(id)?;
        let mut entity = self.store.get(id).await?;

        entity.merge(patch);
        entity.validate()?;
        entity.touch(now());

        let updated = self.store.update(id, entity).await?;
        debug!(kind = E::KIND, %id, "Entity updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let id = EntityId::parse(id)?;
        self.store.delete(id).await?;
        info!(kind = E::KIND, %id, "Entity deleted");
        Ok(())
    }

    pub async fn list(&self) -> DomainResult<Vec<E>> {
        self.store.list().await
    }

    /// 보조 키로 조회합니다 (예: 이름으로 역할 조회).
    ///
    /// 인가 계층이 역할/클레임을 확인할 때 사용할 수 있는 조회 경로입니다.
    pub async fn find_by_key(&self, key: &str) -> DomainResult<E> {
        self.store.get_by_key(key).await
    }
}
