//! 클레임 엔티티.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{merge_text, record_accessors};
use super::{Entity, EntityId};

/// 클레임.
///
/// 구조는 [`Role`](super::Role)과 같지만 독립적으로 관리되며 역할과 합성되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub id: Option<EntityId>,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 클레임 생성 입력.
#[derive(Debug, Clone)]
pub struct ClaimDraft {
    pub name: String,
    pub description: String,
}

/// 클레임 부분 수정 입력.
#[derive(Debug, Clone, Default)]
pub struct ClaimPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Entity for Claim {
    const KIND: &'static str = "claim";

    type Draft = ClaimDraft;
    type Patch = ClaimPatch;

    fn from_draft(draft: ClaimDraft, now: DateTime<Utc>) -> Self {
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

    fn merge(&mut self, patch: ClaimPatch) {
        merge_text(&mut self.name, patch.name);
        merge_text(&mut self.description, patch.description);
    }

    record_accessors!();
}
