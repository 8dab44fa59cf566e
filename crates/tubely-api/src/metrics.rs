//! Prometheus metrics for the API server.

use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "tubely_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tubely_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "tubely_http_requests_in_flight";

    // Upload pipeline metrics
    pub const UPLOADS_TOTAL: &str = "tubely_uploads_total";
    pub const UPLOAD_DURATION_SECONDS: &str = "tubely_upload_duration_seconds";
    pub const UPLOADED_BYTES_TOTAL: &str = "tubely_uploaded_bytes_total";
    pub const PROBE_DURATION_SECONDS: &str = "tubely_probe_duration_seconds";
    pub const FASTSTART_DURATION_SECONDS: &str = "tubely_faststart_duration_seconds";
    pub const STORE_DURATION_SECONDS: &str = "tubely_store_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the end of an upload attempt.
///
/// `stage` is the last stage reached; `outcome` is `"ok"` or an error code.
pub fn record_upload(stage: &str, outcome: &str, duration_secs: f64) {
    let labels = [
        ("stage", stage.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
    histogram!(names::UPLOAD_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record bytes written to the object store.
pub fn record_uploaded_bytes(aspect: &str, bytes: u64) {
    let labels = [("aspect", aspect.to_string())];
    counter!(names::UPLOADED_BYTES_TOTAL, &labels).increment(bytes);
}

/// Record ffprobe duration.
pub fn record_probe_duration(duration_secs: f64) {
    histogram!(names::PROBE_DURATION_SECONDS).record(duration_secs);
}

/// Record fast-start remux duration.
pub fn record_faststart_duration(duration_secs: f64) {
    histogram!(names::FASTSTART_DURATION_SECONDS).record(duration_secs);
}

/// Record object store upload duration.
pub fn record_store_duration(duration_secs: f64) {
    histogram!(names::STORE_DURATION_SECONDS).record(duration_secs);
}

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
            .unwrap_or_else(|_| unreachable!("literal pattern"))
    })
}

fn video_segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"/(videos|video_upload)/[^/]+")
            .unwrap_or_else(|_| unreachable!("literal pattern"))
    })
}

/// Sanitize path for metrics labels (remove IDs, etc.).
fn sanitize_path(path: &str) -> String {
    let path = uuid_pattern().replace_all(path, ":id");
    // Anything else in an ID position collapses too, so bad IDs don't explode cardinality
    let path = video_segment_pattern().replace_all(&path, "/$1/:id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
