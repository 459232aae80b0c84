//! HTTP 요청 metrics middleware.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::metrics::{record_http_duration, record_http_request, record_http_response, route_label};

/// 요청마다 다음 메트릭을 기록합니다:
/// - `http_requests_total` (method, path)
/// - `http_responses_total` (method, path, status)
/// - `http_request_duration_seconds` (method, path)
///
/// `path`는 매칭된 라우트 템플릿이며, 매칭이 없으면 `unmatched`입니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = route_label(&request);

    record_http_request(&method, &path);

    let response = next.run(request).await;

    record_http_response(&method, &path, response.status().as_u16());
    record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    response
}
