//! Veritas API 서버.
//!
//! 설정을 로드하고 저장소(PostgreSQL 또는 인메모리)를 준비한 뒤
//! Axum 기반 REST API 서버를 시작합니다.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use veritas_api::metrics::setup_metrics_recorder;
use veritas_api::middleware::{metrics_layer, RateLimitConfig, RateLimitState};
use veritas_api::repository::run_migrations;
use veritas_api::routes::create_api_router;
use veritas_api::state::AppState;
use veritas_api::TokenService;
use veritas_core::{init_logging, AppConfig, DatabaseConfig, LogConfig, ServerConfig};

/// 버킷 정리 주기.
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// CORS 레이어 생성.
///
/// `server.cors_origins`(쉼표 구분)가 설정되어 있으면 해당 origin만 허용하고,
/// 없으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let configured = config.cors_origins.as_deref().filter(|o| !o.is_empty());

    let allow_origin = match configured {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("cors_origins is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        None => {
            warn!("cors_origins not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // any origin과 자격 증명은 함께 쓸 수 없음
        .allow_credentials(configured.is_some())
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    config: &AppConfig,
    metrics_handle: PrometheusHandle,
    rate_limit: Option<RateLimitState>,
) -> Router {
    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let api_router = create_api_router(&state, rate_limit).with_state(state);

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(cors_layer(&config.server))
}

/// 저장소 준비.
///
/// `database.url`이 있으면 PostgreSQL에 연결하고 마이그레이션을 실행합니다.
/// 연결에 실패하면 서버를 시작하지 않습니다.
async fn create_app_state(
    config: &DatabaseConfig,
    tokens: TokenService,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let Some(database_url) = config.url.as_deref() else {
        warn!(
            default_url = %DatabaseConfig::default_url(),
            "database.url not set, using in-memory store (data is lost on restart)"
        );
        return Ok(AppState::in_memory(tokens));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to connect to database");
            e
        })?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;
    info!("Connected to PostgreSQL successfully");

    run_migrations(&pool).await?;

    Ok(AppState::with_postgres(pool, tokens))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // 설정 로드 (VERITAS_CONFIG로 경로 지정 가능)
    let config = match std::env::var("VERITAS_CONFIG") {
        Ok(path) => AppConfig::load(Some(PathBuf::from(path).as_path()))?,
        Err(_) => AppConfig::load_default()?,
    };

    init_logging(LogConfig::from(&config.logging))?;
    info!("Starting Veritas API server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let addr = config.server.socket_addr().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. server.host, server.port 설정을 확인하세요."
        );
        e
    })?;

    let tokens = TokenService::from_config(&config.auth);
    info!(ttl_hours = tokens.ttl().num_hours(), "Token service initialized");

    let state = Arc::new(create_app_state(&config.database, tokens).await?);
    info!(
        version = %state.version,
        has_db = state.db_pool.is_some(),
        "Application state initialized"
    );

    // 전역 종료 토큰 (백그라운드 태스크 종료 전파)
    let shutdown_token = CancellationToken::new();

    let rate_limit = if config.rate_limit.enabled {
        let rate_limit_state = RateLimitState::new(RateLimitConfig::from(&config.rate_limit));
        info!(
            requests_per_minute = config.rate_limit.requests_per_minute,
            burst_size = config.rate_limit.burst_size,
            "Rate limiting configured for /auth"
        );

        let limiter = rate_limit_state.limiter().clone();
        let cancel = shutdown_token.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => limiter.cleanup().await,
                }
            }
        });

        Some(rate_limit_state)
    } else {
        info!("Rate limiting DISABLED (rate_limit.enabled = false)");
        None
    };

    let app = create_router(state, &config, metrics_handle, rate_limit);

    info!(%addr, "API server listening");
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
    .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
///
/// # Arguments
/// * `shutdown_token` - 백그라운드 태스크에 종료를 전파할 CancellationToken
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
}
