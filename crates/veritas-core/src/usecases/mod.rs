//! 엔티티 유스케이스와 자격증명 검증.
//!
//! 유스케이스는 토큰 서비스나 접근 게이트를 호출하지 않습니다.

mod credentials;
mod entity_service;
mod user_service;

pub use credentials::CredentialVerifier;
pub use entity_service::{ClaimService, EntityService, RoleService};
pub use user_service::{SignUp, UserService, UserUpdate};
