//! 역할 엔티티.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{merge_text, record_accessors};
use super::{Entity, EntityId};

/// 역할. 이름은 저장소 내에서 고유합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 역할 생성 입력.
#[derive(Debug, Clone)]
pub struct RoleDraft {
    pub name: String,
    pub description: String,
}

/// 역할 부분 수정 입력.
#[derive(Debug, Clone, Default)]
pub struct RolePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Entity for Role {
    const KIND: &'static str = "role";

    type Draft = RoleDraft;
    type Patch = RolePatch;

    fn from_draft(draft: RoleDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    fn lookup_key(&self) -> &str {
        &self.name
    }

    fn merge(&mut self, patch: RolePatch) {
        merge_text(&mut self.name, patch.name);
        merge_text(&mut self.description, patch.description);
    }

    record_accessors!();
}
