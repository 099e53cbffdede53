//! Prometheus metrics for the API server.

use std::sync::LazyLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Install the global Prometheus recorder.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "reelgen_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "reelgen_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "reelgen_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "reelgen_rate_limit_hits_total";
    pub const PERSISTENCE_FAILURES_TOTAL: &str = "reelgen_persistence_failures_total";
}

static PROJECT_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/projects/[^/]+").expect("project segment pattern is valid")
});

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_rate_limit_hit(path: &str) {
    counter!(names::RATE_LIMIT_HITS_TOTAL, "path" => sanitize_path(path)).increment(1);
}

/// Scenes were generated but could not be stored.
pub fn record_persistence_failure(operation: &str) {
    counter!(names::PERSISTENCE_FAILURES_TOTAL, "operation" => operation.to_string()).increment(1);
}

/// Collapse project ids so label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    PROJECT_SEGMENT
        .replace_all(path, "/projects/:id")
        .into_owned()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/characters/projects/550e8400-e29b-41d4-a716-446655440000/scenes"),
            "/api/characters/projects/:id/scenes"
        );
        assert_eq!(
            sanitize_path("/api/characters/projects/abc"),
            "/api/characters/projects/:id"
        );
        assert_eq!(sanitize_path("/api/characters/projects"), "/api/characters/projects");
    }
}
