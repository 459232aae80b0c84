//! 도메인 에러 타입.
//!
//! 저장소, 유스케이스, 자격증명 검증이 공유하는 에러 분류를 정의합니다.
//! API 계층은 이 분류를 그대로 HTTP 상태 코드로 변환합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 식별자 형식이 올바르지 않음 (저장소 접근 전에 발생)
    #[error("잘못된 식별자: {0}")]
    InvalidIdentifier(String),

    /// 입력 검증 실패
    #[error("입력 검증 실패: {0}")]
    Validation(String),

    /// 엔티티를 찾을 수 없음
    #[error("{kind}을(를) 찾을 수 없습니다: {key}")]
    NotFound { kind: &'static str, key: String },

    /// 고유 키 충돌 (이메일 또는 이름)
    #[error("이미 존재하는 {kind}: {key}")]
    Conflict { kind: &'static str, key: String },

    /// 자격증명 검증 실패.
    ///
    /// 존재하지 않는 이메일과 잘못된 비밀번호를 구분하지 않습니다.
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    AuthenticationFailure,

    /// 저장소 에러
    #[error("저장소 에러: {0}")]
    Persistence(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 도메인 작업을 위한 Result 타입.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// NotFound 에러를 생성합니다.
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Conflict 에러를 생성합니다.
    pub fn conflict(kind: &'static str, key: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            key: key.into(),
        }
    }

    /// 클라이언트 입력에 의한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Persistence(_) | Self::Internal(_))
    }

    /// 에러 코드 문자열 (API 응답용).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "INVALID_ID",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::AuthenticationFailure => "INVALID_CREDENTIALS",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_client_classification() {
        assert!(DomainError::InvalidIdentifier("abc".into()).is_client_error());
        assert!(DomainError::not_found("user", "42").is_client_error());
        assert!(DomainError::AuthenticationFailure.is_client_error());

        assert!(!DomainError::Persistence("connection reset".into()).is_client_error());
        assert!(!DomainError::Internal("hash".into()).is_client_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::conflict("role", "admin").code(), "CONFLICT");
        assert_eq!(
            DomainError::AuthenticationFailure.code(),
            "INVALID_CREDENTIALS"
        );
    }

    #[test]
    fn test_not_found_message_names_kind() {
        let err = DomainError::not_found("claim", "read:users");
        assert!(err.to_string().contains("claim"));
        assert!(err.to_string().contains("read:users"));
    }
}
