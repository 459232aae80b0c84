//! 자격증명 검증.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::User;
use crate::error::{DomainError, DomainResult};
use crate::password;
use crate::store::EntityStore;

/// 이메일과 비밀번호 쌍을 저장된 사용자와 대조합니다.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn EntityStore<User>>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn EntityStore<User>>) -> Self {
        Self { users }
    }

    /// 자격증명을 검증하고 일치하는 사용자를 반환합니다.
    ///
    /// 조회 실패(원인 무관)와 비밀번호 불일치는 모두 같은
    /// `DomainError::AuthenticationFailure`로 보고됩니다.
    /// 알 수 없는 이메일에도 더미 해시 검증을 수행해 두 경로의 비용을 맞춥니다.
    /// 해시 검증은 blocking 스레드 풀에서 실행됩니다.
    pub async fn verify(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = match self.users.get_by_key(email).await {
            Ok(user) => user,
            Err(err) => {
                password::spawn_verify_dummy(password.to_string()).await?;
                match err {
                    DomainError::NotFound { .. } => debug!("Login for unknown email"),
                    other => warn!(error = %other, "User lookup failed during login"),
                }
                return Err(DomainError::AuthenticationFailure);
            }
        };

        password::spawn_verify(password.to_string(), user.password_hash.clone())
            .await?
            .map_err(|err| {
                debug!(user_id = ?user.id, error = %err, "Password verification failed");
                DomainError::AuthenticationFailure
            })?;

        Ok(user)
    }
}
