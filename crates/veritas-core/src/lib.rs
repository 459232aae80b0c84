//! # Veritas Core
//!
//! 신원 및 접근 제어 서비스의 핵심 도메인 모델과 유스케이스를 제공합니다.
//!
//! 이 크레이트는 API 서버와 테스트에서 공통으로 사용하는 기본 구성요소를 제공합니다:
//! - 사용자/역할/클레임 엔티티
//! - 엔티티 저장소 추상화와 인메모리 구현
//! - 엔티티 유스케이스 (생성/조회/부분 수정/삭제)
//! - 자격증명 검증과 비밀번호 해싱
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod password;
pub mod store;
pub mod usecases;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use store::{EntityStore, InMemoryStore};
pub use usecases::*;
