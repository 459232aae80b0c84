//! 인증.
//!
//! # 구성 요소
//!
//! - [`TokenService`]: HS256 JWT 발급/검증
//! - [`require_auth`]: 보호된 라우터에 적용하는 접근 게이트 미들웨어
//! - [`AuthUser`]: 게이트를 통과한 요청의 사용자 정보 추출기
//!
//! 게이트는 토큰 유효성만 확인하며 역할/클레임은 검사하지 않습니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(user: AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.email)
//! }
//! ```

mod middleware;
mod token;

pub use middleware::{bearer_token, require_auth, AuthError, AuthUser};
pub use token::{TokenClaims, TokenError, TokenService};
