//! PostgreSQL 엔티티 저장소.
//!
//! 사용자, 역할, 클레임 테이블은 모두 같은 형태(UUID `id`, TEXT 컬럼들,
//! `created_at`/`updated_at`)이므로 하나의 제네릭 저장소가 SQL을 미리 만들어 두고
//! 세 종류 모두를 처리합니다.

mod named;
mod users;

pub use named::NamedRow;
pub use users::UserRow;

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};
use uuid::Uuid;
use veritas_core::{now, DomainError, DomainResult, Entity, EntityId, EntityStore};

/// 테이블에 매핑되는 엔티티.
pub trait PgEntity: Entity {
    /// `SELECT *` 결과 행
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    const TABLE: &'static str;

    /// 고유 조회 키 컬럼 (`email` 또는 `name`)
    const KEY_COLUMN: &'static str;

    /// 변경 가능한 TEXT 컬럼. `column_values`와 같은 순서입니다.
    const COLUMNS: &'static [&'static str];

    fn column_values(&self) -> Vec<&str>;

    fn from_row(row: Self::Row) -> Self;
}

/// 미리 만들어 둔 SQL 문장.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    pub insert: String,
    pub select_by_id: String,
    pub select_by_key: String,
    pub update: String,
    pub delete: String,
    pub list: String,
}

impl Statements {
    pub fn for_entity<E: PgEntity>() -> Self {
        let table = E::TABLE;
        let columns = E::COLUMNS;
        let n = columns.len();

        let placeholders: Vec<String> = (1..=n + 2).map(|i| format!("${i}")).collect();
        let insert = format!(
            "INSERT INTO {table} ({}, created_at, updated_at) VALUES ({}) RETURNING id",
            columns.join(", "),
            placeholders.join(", ")
        );

        // $1 = id, $2..=$n+1 = 컬럼, $n+2 = updated_at
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 2))
            .collect();
        let update = format!(
            "UPDATE {table} SET {}, updated_at = GREATEST(${}, updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 RETURNING *",
            assignments.join(", "),
            n + 2
        );

        Self {
            insert,
            select_by_id: format!("SELECT * FROM {table} WHERE id = $1"),
            select_by_key: format!("SELECT * FROM {table} WHERE {} = $1", E::KEY_COLUMN),
            update,
            delete: format!("DELETE FROM {table} WHERE id = $1"),
            list: format!("SELECT * FROM {table} ORDER BY created_at, id"),
        }
    }
}

/// `PgPool` 기반 `EntityStore` 구현.
pub struct PgEntityStore<E: PgEntity> {
    pool: PgPool,
    sql: Statements,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PgEntity> PgEntityStore<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            sql: Statements::for_entity::<E>(),
            _entity: PhantomData,
        }
    }

    pub fn statements(&self) -> &Statements {
        &self.sql
    }
}

/// 고유 제약 위반은 `Conflict`, 그 외는 `Persistence`.
fn map_db_error(kind: &'static str, key: &str, err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::conflict(kind, key),
        _ => DomainError::Persistence(err.to_string()),
    }
}

#[async_trait]
impl<E: PgEntity> EntityStore<E> for PgEntityStore<E> {
    async fn create(&self, mut entity: E) -> DomainResult<EntityId> {
        entity.stamp_created(now());

        let mut query = sqlx::query_scalar::<_, Uuid>(&self.sql.insert);
        for value in entity.column_values() {
            query = query.bind(value);
        }
        let id = query
            .bind(entity.created_at())
            .bind(entity.updated_at())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(E::KIND, entity.lookup_key(), e))?;

        let id = EntityId::from_uuid(id);
        debug!(kind = E::KIND, %id, "row inserted");
        Ok(id)
    }

    async fn get(&self, id: EntityId) -> DomainResult<E> {
        sqlx::query_as::<_, E::Row>(&self.sql.select_by_id)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?
            .map(E::from_row)
            .ok_or_else(|| DomainError::not_found(E::KIND, id.to_string()))
    }

    async fn get_by_key(&self, key: &str) -> DomainResult<E> {
        sqlx::query_as::<_, E::Row>(&self.sql.select_by_key)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?
            .map(E::from_row)
            .ok_or_else(|| DomainError::not_found(E::KIND, key))
    }

    async fn update(&self, id: EntityId, mut entity: E) -> DomainResult<E> {
        entity.touch(now());

        let mut query = sqlx::query_as::<_, E::Row>(&self.sql.update).bind(id.as_uuid());
        for value in entity.column_values() {
            query = query.bind(value);
        }
        let row = query
            .bind(entity.updated_at())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(E::KIND, entity.lookup_key(), e))?;

        match row {
            Some(row) => Ok(E::from_row(row)),
            None => {
                debug!(kind = E::KIND, %id, "update on missing row ignored");
                Ok(entity)
            }
        }
    }

    async fn delete(&self, id: EntityId) -> DomainResult<()> {
        let result = sqlx::query(&self.sql.delete)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?;

        if result.rows_affected() == 0 {
            debug!(kind = E::KIND, %id, "delete on missing row ignored");
        }
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<E>> {
        let rows = sqlx::query_as::<_, E::Row>(&self.sql.list)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Persistence(e.to_string()))?;

        Ok(rows.into_iter().map(E::from_row).collect())
    }
}

/// 스키마 마이그레이션 실행.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations...");
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use veritas_core::{Claim, Role, User};

    #[test]
    fn test_user_statements() {
        let sql = Statements::for_entity::<User>();

        assert_eq!(
            sql.insert,
            "INSERT INTO users (username, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id"
        );
        assert_eq!(sql.select_by_key, "SELECT * FROM users WHERE email = $1");
        assert!(sql
            .update
            .starts_with("UPDATE users SET username = $2, email = $3, password_hash = $4, "));
        assert!(sql.update.contains("GREATEST($5, updated_at + INTERVAL '1 microsecond')"));
        assert!(sql.update.ends_with("WHERE id = $1 RETURNING *"));
    }

    #[test]
    fn test_role_and_claim_use_separate_tables() {
        let roles = Statements::for_entity::<Role>();
        let claims = Statements::for_entity::<Claim>();

        assert_eq!(roles.select_by_key, "SELECT * FROM roles WHERE name = $1");
        assert_eq!(claims.select_by_key, "SELECT * FROM claims WHERE name = $1");
        assert_eq!(claims.list, "SELECT * FROM claims ORDER BY created_at, id");
        assert_eq!(roles.delete, "DELETE FROM roles WHERE id = $1");
        assert!(!claims.update.contains("created_at ="));
    }

    #[test]
    fn test_non_database_errors_are_persistence() {
        let err = map_db_error("user", "a@b.c", sqlx::Error::RowNotFound);
        assert!(matches!(err, DomainError::Persistence(_)));
    }
}
