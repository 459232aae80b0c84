//! 사용자 생명주기 통합 테스트.
//!
//! 가입 → 조회 → 자격증명 검증 → 부분 수정 → 삭제 흐름을 인메모리 저장소로 검증합니다.

use std::sync::Arc;

use veritas_core::{
    CredentialVerifier, DomainError, EntityStore, InMemoryStore, SignUp, User, UserService,
    UserUpdate,
};

struct Fixture {
    users: UserService,
    verifier: CredentialVerifier,
}

fn fixture() -> Fixture {
    let store: Arc<dyn EntityStore<User>> = Arc::new(InMemoryStore::<User>::new());
    Fixture {
        users: UserService::new(store.clone()),
        verifier: CredentialVerifier::new(store),
    }
}

fn alice() -> SignUp {
    SignUp {
        name: "alice".into(),
        email: "alice@x.com".into(),
        password: "pw123456".into(),
    }
}

#[tokio::test]
async fn test_create_read_verify() {
    let fx = fixture();

    let id = fx.users.sign_up(alice()).await.unwrap();
    let user = fx.users.read(&id.to_string()).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@x.com");

    let verified = fx.verifier.verify("alice@x.com", "pw123456").await.unwrap();
    assert_eq!(verified.id, Some(id));

    let err = fx.verifier.verify("alice@x.com", "wrong").await.unwrap_err();
    assert_eq!(err, DomainError::AuthenticationFailure);
}

#[tokio::test]
async fn test_partial_update_changes_only_email() {
    let fx = fixture();
    let id = fx.users.sign_up(alice()).await.unwrap().to_string();
    let before = fx.users.read(&id).await.unwrap();

    let after = fx
        .users
        .update(
            &id,
            UserUpdate {
                email: Some("new@x.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(after.email, "new@x.com");
    assert_eq!(after.username, "alice");
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);

    // 새 이메일로 로그인, 이전 이메일은 실패
    assert!(fx.verifier.verify("new@x.com", "pw123456").await.is_ok());
    assert_eq!(
        fx.verifier.verify("alice@x.com", "pw123456").await.unwrap_err(),
        DomainError::AuthenticationFailure
    );
}

#[tokio::test]
async fn test_invalid_id_is_rejected() {
    let fx = fixture();
    let err = fx
        .users
        .update("invalid", UserUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidIdentifier(_)));
}

#[tokio::test]
async fn test_delete_then_read_not_found_and_login_fails() {
    let fx = fixture();
    let id = fx.users.sign_up(alice()).await.unwrap().to_string();

    fx.users.delete(&id).await.unwrap();

    assert!(matches!(
        fx.users.read(&id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(fx.verifier.verify("alice@x.com", "pw123456").await.is_err());
    assert!(fx.users.list().await.unwrap().is_empty());
}
