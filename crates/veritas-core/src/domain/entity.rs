//! 엔티티 계약.
//!
//! 사용자, 역할, 클레임은 모두 같은 생명주기를 따릅니다:
//! 생성 시 저장소가 식별자를 부여하고, 부분 수정은 `id`와 `created_at`을 건드리지 않으며
//! 항상 `updated_at`을 이전 값보다 크게 갱신합니다.

use std::fmt::Debug;

use chrono::{DateTime, Duration, SubsecRound, Utc};

use super::EntityId;
use crate::error::DomainError;

/// 현재 시각 (마이크로초 단위로 절삭).
///
/// PostgreSQL `TIMESTAMPTZ` 정밀도와 맞춰 저장 전후의 값이 같도록 합니다.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 저장소와 유스케이스가 다루는 엔티티.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// 로그 및 에러 메시지에 쓰이는 종류 이름 (`"user"`, `"role"`, `"claim"`)
    const KIND: &'static str;

    /// 생성 입력
    type Draft: Send;

    /// 부분 수정 입력. 비어 있는 필드는 기존 값을 유지합니다.
    type Patch: Send;

    /// 생성 입력으로 엔티티를 만들고 두 타임스탬프를 `now`로 설정합니다.
    fn from_draft(draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// 저장 전에는 `None`.
    fn id(&self) -> Option<EntityId>;

    fn assign_id(&mut self, id: EntityId);

    /// 보조 조회 키 (사용자는 이메일, 역할/클레임은 이름). 저장소 내에서 고유합니다.
    fn lookup_key(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>);

    /// 부분 수정 입력을 병합합니다.
    fn merge(&mut self, patch: Self::Patch);

    /// 필수 필드를 확인합니다. 생성과 병합 직후에 호출됩니다.
    fn validate(&self) -> Result<(), DomainError> {
        if self.lookup_key().trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "{} 키는 비어 있을 수 없습니다",
                Self::KIND
            )));
        }
        Ok(())
    }

    /// 생성 타임스탬프와 수정 타임스탬프를 모두 `now`로 설정합니다.
    fn stamp_created(&mut self, now: DateTime<Utc>) {
        self.set_timestamps(now, now);
    }

    /// `updated_at`을 갱신합니다. 결과는 항상 이전 값보다 큽니다.
    fn touch(&mut self, now: DateTime<Utc>) {
        let previous = self.updated_at();
        let next = if now > previous {
            now
        } else {
            previous + Duration::microseconds(1)
        };
        let created_at = self.created_at();
        self.set_timestamps(created_at, next);
    }
}

/// 비어 있지 않은 값만 덮어씁니다. 빈 문자열은 "변경 없음"입니다.
pub(crate) fn merge_text(target: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *target = value;
    }
}

/// `id`, `created_at`, `updated_at` 필드를 가진 엔티티의 공통 접근자.
macro_rules! record_accessors {
    () => {
        fn id(&self) -> Option<$crate::domain::EntityId> {
            self.id
        }

        fn assign_id(&mut self, id: $crate::domain::EntityId) {
            self.id = Some(id);
        }

        fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
            self.created_at
        }

        fn updated_at(&self) -> chrono::DateTime<chrono::Utc> {
            self.updated_at
        }

        fn set_timestamps(
            &mut self,
            created_at: chrono::DateTime<chrono::Utc>,
            updated_at: chrono::DateTime<chrono::Utc>,
        ) {
            self.created_at = created_at;
            self.updated_at = updated_at;
        }
    };
}

pub(crate) use record_accessors;
