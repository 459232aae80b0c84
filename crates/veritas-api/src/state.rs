//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 `Arc`로 래핑되어 axum의 State extractor로 주입됩니다.
//! 저장소 구현(PostgreSQL 또는 인메모리)은 생성 시점에 한 번 결정됩니다.

use std::sync::Arc;

use sqlx::PgPool;
use veritas_core::{
    Claim, ClaimService, CredentialVerifier, EntityStore, InMemoryStore, Role, RoleService, User,
    UserService,
};

use crate::auth::TokenService;
use crate::repository::PgEntityStore;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 유스케이스 (가입, 조회, 부분 수정, 삭제)
    pub users: UserService,

    /// 역할 유스케이스
    pub roles: RoleService,

    /// 클레임 유스케이스
    pub claims: ClaimService,

    /// 로그인 자격증명 검증기
    pub credentials: CredentialVerifier,

    /// 토큰 발급/검증 서비스 - 프로세스 전체에서 불변
    pub tokens: Arc<TokenService>,

    /// 데이터베이스 연결 풀. 인메모리 모드에서는 `None`.
    pub db_pool: Option<PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    fn assemble(
        users: Arc<dyn EntityStore<User>>,
        roles: Arc<dyn EntityStore<Role>>,
        claims: Arc<dyn EntityStore<Claim>>,
        tokens: TokenService,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            users: UserService::new(users.clone()),
            roles: RoleService::new(roles),
            claims: ClaimService::new(claims),
            credentials: CredentialVerifier::new(users),
            tokens: Arc::new(tokens),
            db_pool,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 인메모리 저장소로 상태 생성 (개발/테스트용).
    pub fn in_memory(tokens: TokenService) -> Self {
        Self::assemble(
            Arc::new(InMemoryStore::<User>::new()),
            Arc::new(InMemoryStore::<Role>::new()),
            Arc::new(InMemoryStore::<Claim>::new()),
            tokens,
            None,
        )
    }

    /// PostgreSQL 저장소로 상태 생성.
    pub fn with_postgres(pool: PgPool, tokens: TokenService) -> Self {
        Self::assemble(
            Arc::new(PgEntityStore::<User>::new(pool.clone())),
            Arc::new(PgEntityStore::<Role>::new(pool.clone())),
            Arc::new(PgEntityStore::<Claim>::new(pool.clone())),
            tokens,
            Some(pool),
        )
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").fetch_one(pool).await.is_ok(),
            None => false,
        }
    }
}

/// 테스트용 서명 키 (32바이트 이상).
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "veritas-test-signing-key-0123456789abcdef";

/// 테스트용 AppState 생성 (인메모리 저장소, 고정 서명 키, 24시간 TTL).
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let secret = secrecy::SecretString::from(TEST_JWT_SECRET.to_string());
    AppState::in_memory(TokenService::new(&secret, chrono::Duration::hours(24)))
}
