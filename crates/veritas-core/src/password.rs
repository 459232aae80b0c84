//! 비밀번호 해싱.
//!
//! Argon2id(PHC 문자열, 비밀번호마다 무작위 솔트)로 해싱하고
//! `PasswordVerifier`로 상수 시간 비교합니다.
//!
//! Argon2 연산은 CPU를 오래 점유하므로 async 코드에서는 `spawn_*` 함수로
//! blocking 스레드 풀에서 실행합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use tracing::error;

use crate::error::{DomainError, DomainResult};

/// 비밀번호 최소 길이 (문자 수).
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호가 일치하지 않습니다")]
    Mismatch,
    #[error("저장된 해시 형식이 올바르지 않습니다")]
    MalformedHash,
    #[error("비밀번호는 최소 8자 이상이어야 합니다")]
    TooShort,
}

/// 존재하지 않는 사용자에 대한 검증에 쓰는 해시.
///
/// 알 수 없는 이메일과 잘못된 비밀번호의 응답 시간을 맞춥니다.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("veritas-dummy-password").ok());

/// 평문 비밀번호를 Argon2id PHC 문자열로 해싱합니다.
///
/// # Returns
///
/// `$argon2id$v=19$...` 형식의 해시
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// 저장된 PHC 해시와 비밀번호를 비교합니다.
///
/// # Arguments
///
/// * `password` - 입력된 평문 비밀번호
/// * `stored_hash` - 저장된 PHC 형식 해시
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

/// 더미 해시에 대해 검증을 수행하고 결과를 버립니다.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

// ============================================================================
// blocking 스레드 풀 실행
// ============================================================================

async fn run_blocking<T, F>(task: F) -> DomainResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        error!(error = %e, "Password task failed");
        DomainError::Internal(format!("비밀번호 작업 실패: {}", e))
    })
}

/// [`hash_password`]를 blocking 스레드 풀에서 실행합니다.
///
/// 바깥 `Result`는 작업 실행 실패(`DomainError::Internal`)입니다.
pub async fn spawn_hash(password: String) -> DomainResult<Result<String, PasswordError>> {
    run_blocking(move || hash_password(&password)).await
}

/// [`verify_password`]를 blocking 스레드 풀에서 실행합니다.
pub async fn spawn_verify(
    password: String,
    stored_hash: String,
) -> DomainResult<Result<(), PasswordError>> {
    run_blocking(move || verify_password(&password, &stored_hash)).await
}

/// [`verify_dummy`]를 blocking 스레드 풀에서 실행합니다.
pub async fn spawn_verify_dummy(password: String) -> DomainResult<()> {
    run_blocking(move || verify_dummy(&password)).await
}

/// 길이 요구사항을 확인합니다.
pub fn check_length(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}
