//! `users` 테이블 매핑.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use veritas_core::{EntityId, User};

use super::PgEntity;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: Some(EntityId::from_uuid(row.id)),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PgEntity for User {
    type Row = UserRow;

    const TABLE: &'static str = "users";
    const KEY_COLUMN: &'static str = "email";
    const COLUMNS: &'static [&'static str] = &["username", "email", "password_hash"];

    fn column_values(&self) -> Vec<&str> {
        vec![self.username.as_str(), self.email.as_str(), self.password_hash.as_str()]
    }

    fn from_row(row: UserRow) -> Self {
        row.into()
    }
}
