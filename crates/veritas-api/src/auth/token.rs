//! JWT 토큰 발급 및 검증.
//!
//! 서명 키는 부팅 시 설정에서 한 번 로드되어 불변으로 유지됩니다.
//! 폐기 목록은 없으며 토큰은 만료 전까지 유효합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use veritas_core::{AuthConfig, MAX_TOKEN_TTL_HOURS};

/// JWT 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// 사용자 이메일
    pub email: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// 토큰 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// 형식 오류, 잘못된 알고리즘, 서명 불일치
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("토큰 서명 실패: {0}")]
    Signing(String),
}

/// HS256 토큰 서비스.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// # Arguments
    ///
    /// * `secret` - HS256 서명 키
    /// * `ttl` - 발급 시각부터 만료까지의 시간
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// 설정 검증을 거친 TTL을 사용합니다. 표현 범위를 넘는 값은 상한으로 고정됩니다.
    pub fn from_config(config: &AuthConfig) -> Self {
        let hours = config.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS);
        let ttl = Duration::try_hours(hours).unwrap_or(Duration::hours(MAX_TOKEN_TTL_HOURS));
        Self::new(&config.jwt_secret, ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰을 발급합니다.
    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, Utc::now())
    }

    /// 지정한 발급 시각으로 토큰을 발급합니다. `exp = issued_at + ttl`.
    pub fn issue_at(&self, email: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("만료 시각이 표현 범위를 벗어났습니다".to_string()))?;
        let claims = TokenClaims {
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// 서명, 알고리즘, 만료를 검증하고 페이로드를 반환합니다.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                _ => TokenError::InvalidToken,
            })
    }
}
