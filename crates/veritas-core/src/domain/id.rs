//! 엔티티 식별자.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// 저장소가 생성 시 부여하는 불투명 식별자 (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// 새 무작위 식별자를 생성합니다.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// 경로 문자열에서 식별자를 파싱합니다.
    ///
    /// # Returns
    ///
    /// 형식이 올바르지 않으면 `DomainError::InvalidIdentifier`
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        raw.parse()
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip_display() {
        let id = EntityId::generate();
        let parsed = EntityId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = EntityId::parse("not-an-id").unwrap_err();
        assert_eq!(err, DomainError::InvalidIdentifier("not-an-id".to_string()));

        assert!(EntityId::parse("").is_err());
        // Mongo 스타일 24자리 hex는 UUID가 아님
        assert!(EntityId::parse("64b7f0c2a1e4d3b2c1a09f8e").is_err());
    }
}
