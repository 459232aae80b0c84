//! `roles`, `claims` 테이블 매핑.
//!
//! 두 테이블은 컬럼 구성이 같아 행 타입을 공유합니다.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use veritas_core::{Claim, EntityId, Role};

use super::PgEntity;

/// 이름/설명을 가진 레코드 행.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NamedRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

macro_rules! named_entity {
    ($entity:ty, $table:literal) => {
        impl From<NamedRow> for $entity {
            fn from(row: NamedRow) -> Self {
                Self {
                    id: Some(EntityId::from_uuid(row.id)),
                    name: row.name,
                    description: row.description,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            }
        }

        impl PgEntity for $entity {
            type Row = NamedRow;

            const TABLE: &'static str = $table;
            const KEY_COLUMN: &'static str = "name";
            const COLUMNS: &'static [&'static str] = &["name", "description"];

            fn column_values(&self) -> Vec<&str> {
                vec![self.name.as_str(), self.description.as_str()]
            }

            fn from_row(row: NamedRow) -> Self {
                row.into()
            }
        }
    };
}

named_entity!(Role, "roles");
named_entity!(Claim, "claims");
