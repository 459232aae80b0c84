//! 사용자 엔티티.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entity::{merge_text, record_accessors};
use super::{Entity, EntityId};
use crate::error::DomainError;

/// 사용자.
///
/// 비밀번호는 Argon2id PHC 문자열로만 보관하며 직렬화되지 않습니다.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Option<EntityId>,
    pub username: String,
    /// 로그인 식별자. 저장소 내에서 고유합니다.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// 사용자 생성 입력 (비밀번호는 이미 해싱된 상태).
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// 사용자 부분 수정 입력.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl Entity for User {
    const KIND: &'static str = "user";

    type Draft = UserDraft;
    type Patch = UserPatch;

    fn from_draft(draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    fn lookup_key(&self) -> &str {
        &self.email
    }

    fn merge(&mut self, patch: UserPatch) {
        merge_text(&mut self.username, patch.username);
        merge_text(&mut self.email, patch.email);
        merge_text(&mut self.password_hash, patch.password_hash);
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.username.trim().is_empty() {
            return Err(DomainError::Validation("이름은 필수입니다".into()));
        }
        if !self.email.contains('@') {
            return Err(DomainError::Validation(format!(
                "잘못된 이메일 형식: {}",
                self.email
            )));
        }
        Ok(())
    }

    record_accessors!();
}
