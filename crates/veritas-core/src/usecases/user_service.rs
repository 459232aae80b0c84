//! 사용자 유스케이스.
//!
//! 제네릭 엔티티 유스케이스에 가입과 비밀번호 해싱을 더합니다.

use std::sync::Arc;

use tracing::warn;

use super::EntityService;
use crate::domain::{EntityId, User, UserDraft, UserPatch};
use crate::error::{DomainError, DomainResult};
use crate::password::{self, PasswordError};
use crate::store::EntityStore;

/// 가입 입력 (평문 비밀번호).
#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 사용자 부분 수정 입력. 비어 있거나 없는 필드는 유지됩니다.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: EntityService<User>,
}

async fn hash(password: &str) -> DomainResult<String> {
    password::check_length(password).map_err(|e| DomainError::Validation(e.to_string()))?;
    password::spawn_hash(password.to_string()).await?.map_err(|e: PasswordError| {
        warn!(error = %e, "Password hashing failed");
        DomainError::Internal(e.to_string())
    })
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore<User>>) -> Self {
        Self {
            users: EntityService::new(store),
        }
    }

    /// 가입: 비밀번호를 해싱한 뒤 사용자를 생성합니다.
    ///
    /// 이미 사용 중인 이메일은 저장소가 `Conflict`로 거부합니다.
    pub async fn sign_up(&self, input: SignUp) -> DomainResult<EntityId> {
        let password_hash = hash(&input.password).await?;

        self.users
            .create(UserDraft {
                username: input.name,
                email: input.email,
                password_hash,
            })
            .await
    }

    pub async fn read(&self, id: &str) -> DomainResult<User> {
        self.users.read(id).await
    }

    /// 부분 수정. 새 비밀번호가 주어지면 병합 전에 해싱합니다.
    pub async fn update(&self, id: &str, input: UserUpdate) -> DomainResult<User> {
        let password_hash = match input.password.as_deref() {
            Some(password) if !password.is_empty() => Some(hash(password).await?),
            _ => None,
        };

        self.users
            .update(
                id,
                UserPatch {
                    username: input.name,
                    email: input.email,
                    password_hash,
                },
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        self.users.delete(id).await
    }

    pub async fn list(&self) -> DomainResult<Vec<User>> {
        self.users.list().await
    }

    /// 이메일로 조회합니다.
    pub async fn find_by_email(&self, email: &str) -> DomainResult<User> {
        self.users.find_by_key(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use crate::store::InMemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryStore::<User>::new()))
    }

    fn alice() -> SignUp {
        SignUp {
            name: "alice".into(),
            email: "alice@x.com".into(),
            password: "pw123456".into(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_stores_hash_not_plaintext() {
        let service = service();
        let id = service.sign_up(alice()).await.unwrap();

        let user = service.read(&id.to_string()).await.unwrap();
        assert_ne!(user.password_hash, "pw123456");
        assert!(verify_password("pw123456", &user.password_hash).is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_short_password_rejected() {
        let err = service()
            .sign_up(SignUp {
                password: "short".into(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let service = service();
        service.sign_up(alice()).await.unwrap();

        let err = service.sign_up(alice()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { kind: "user", .. }));
    }

    #[tokio::test]
    async fn test_update_rehashes_new_password_only() {
        let service = service();
        let id = service.sign_up(alice()).await.unwrap().to_string();
        let original = service.read(&id).await.unwrap();

        // 비밀번호 없는 수정은 해시를 유지
        let renamed = service
            .update(
                &id,
                UserUpdate {
                    name: Some("alice2".into()),
                    password: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.password_hash, original.password_hash);

        let changed = service
            .update(
                &id,
                UserUpdate {
                    password: Some("newpass99".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(verify_password("newpass99", &changed.password_hash).is_ok());
        assert!(verify_password("pw123456", &changed.password_hash).is_err());
        assert_eq!(changed.username, "alice2");
    }
}
