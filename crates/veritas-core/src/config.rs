//! 설정 관리.
//!
//! 기본값 → (선택) TOML 파일 → `VERITAS__` 환경 변수 순서로 병합합니다.
//! 서명 키는 `SecretString`으로 보관되며 소스 코드에 기본값이 없습니다.

use std::net::SocketAddr;
use std::path::Path;

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// HS256 서명 키 최소 길이 (바이트).
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// 토큰 유효 시간 상한 (1년).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// 기본 데이터베이스 이름.
pub const DEFAULT_DB_NAME: &str = "housekeeper";

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// `/auth/*` 요청 제한 설정
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 쉼표로 구분된 CORS 허용 origin. 없으면 모든 origin 허용.
    #[serde(default)]
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// 바인딩 주소.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 인메모리 저장소를 사용합니다.
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 풀에서 연결을 얻는 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 3,
        }
    }
}

impl DatabaseConfig {
    /// 기본 로컬 연결 URL (`postgres://localhost:5432/housekeeper`).
    pub fn default_url() -> String {
        format!("postgres://localhost:5432/{}", DEFAULT_DB_NAME)
    }
}

/// 인증 설정.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HS256 서명 키
    #[serde(deserialize_with = "deserialize_secret")]
    pub jwt_secret: SecretString,
    /// 토큰 유효 시간 (시간)
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::from(jwt_secret.into()),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret는 최소 {}바이트여야 합니다",
                MIN_JWT_SECRET_LEN
            )));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return Err(ConfigError::Message(format!(
                "auth.token_ttl_hours는 1 이상 {} 이하여야 합니다",
                MAX_TOKEN_TTL_HOURS
            )));
        }
        Ok(())
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨 필터
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 요청 제한 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// 클라이언트 IP당 분당 요청 수
    pub requests_per_minute: u32,
    /// 순간 허용 추가 요청 수
    pub burst_size: u32,
    /// `X-Forwarded-For`/`X-Real-IP`를 클라이언트 주소로 사용할지 여부.
    /// 신뢰할 수 있는 리버스 프록시 뒤에서만 켭니다.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 30,
            burst_size: 5,
            trust_proxy_headers: false,
        }
    }
}

impl AppConfig {
    /// 기본값만 채워진 빌더.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let server = ServerConfig::default();
        let database = DatabaseConfig::default();
        let logging = LoggingConfig::default();
        let rate_limit = RateLimitSettings::default();

        config::Config::builder()
            .set_default("server.host", server.host)?
            .set_default("server.port", i64::from(server.port))?
            .set_default("server.request_timeout_secs", server.request_timeout_secs)?
            .set_default("database.max_connections", i64::from(database.max_connections))?
            .set_default("database.acquire_timeout_secs", database.acquire_timeout_secs)?
            .set_default("auth.token_ttl_hours", default_token_ttl_hours())?
            .set_default("logging.level", logging.level)?
            .set_default("logging.format", logging.format)?
            .set_default("rate_limit.enabled", rate_limit.enabled)?
            .set_default(
                "rate_limit.requests_per_minute",
                i64::from(rate_limit.requests_per_minute),
            )?
            .set_default("rate_limit.burst_size", i64::from(rate_limit.burst_size))?
            .set_default("rate_limit.trust_proxy_headers", rate_limit.trust_proxy_headers)
    }

    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `VERITAS__AUTH__JWT_SECRET` 형식 외에 `DATABASE_URL`, `JWT_SECRET`, `PORT`도
    /// 인식하며 이 값들이 가장 우선합니다.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<i64>().ok());

        let config = builder
            .add_source(
                Environment::with_prefix("VERITAS")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("server.port", port)?
            .build()?;

        Self::from_config(config)
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Some(Path::new("config/default.toml")))
    }

    /// 병합된 설정을 역직렬화하고 검증합니다.
    pub fn from_config(config: config::Config) -> Result<Self, ConfigError> {
        let app: AppConfig = config.try_deserialize()?;
        app.auth.validate()?;
        Ok(app)
    }
}
