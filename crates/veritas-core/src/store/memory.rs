//! 인메모리 엔티티 저장소.
//!
//! 테스트와 데이터베이스가 설정되지 않은 개발 환경에서 사용합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::EntityStore;
use crate::domain::{now, Entity, EntityId};
use crate::error::{DomainError, DomainResult};

/// `RwLock<HashMap>` 기반 저장소.
pub struct InMemoryStore<E: Entity> {
    records: RwLock<HashMap<EntityId, E>>,
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// 저장된 레코드 수.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn key_taken<E: Entity>(records: &HashMap<EntityId, E>, key: &str, except: Option<EntityId>) -> bool {
    records
        .iter()
        .any(|(id, record)| Some(*id) != except && record.lookup_key() == key)
}

#[async_trait]
impl<E: Entity> EntityStore<E> for InMemoryStore<E> {
    async fn create(&self, mut entity: E) -> DomainResult<EntityId> {
        let mut records = self.records.write().await;

        if key_taken(&records, entity.lookup_key(), None) {
            return Err(DomainError::conflict(E::KIND, entity.lookup_key()));
        }

        let id = EntityId::generate();
        entity.assign_id(id);
        entity.stamp_created(now());
        records.insert(id, entity);

        debug!(kind = E::KIND, %id, "record inserted");
        Ok(id)
    }

    async fn get(&self, id: EntityId) -> DomainResult<E> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(E::KIND, id.to_string()))
    }

    async fn get_by_key(&self, key: &str) -> DomainResult<E> {
        self.records
            .read()
            .await
            .values()
            .find(|record| record.lookup_key() == key)
            .cloned()
            .ok_or_else(|| DomainError::not_found(E::KIND, key))
    }

    async fn update(&self, id: EntityId, mut entity: E) -> DomainResult<E> {
        let mut records = self.records.write().await;

        let Some(existing) = records.get(&id) else {
            debug!(kind = E::KIND, %id, "update on missing record ignored");
            return Ok(entity);
        };

        if key_taken(&records, entity.lookup_key(), Some(id)) {
            return Err(DomainError::conflict(E::KIND, entity.lookup_key()));
        }

        // id와 created_at은 저장된 값을 유지
        let created_at = existing.created_at();
        entity.assign_id(id);
        entity.set_timestamps(created_at, entity.updated_at().max(existing.updated_at()));
        entity.touch(now());

        records.insert(id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: EntityId) -> DomainResult<()> {
        if self.records.write().await.remove(&id).is_none() {
            debug!(kind = E::KIND, %id, "delete on missing record ignored");
        }
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<E>> {
        let mut all: Vec<E> = self.records.read().await.values().cloned().collect();
        all.sort_by_key(|record| (record.created_at(), record.id()));
        Ok(all)
    }
}
