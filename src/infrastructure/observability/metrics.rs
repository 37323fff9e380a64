//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("valid uuid regex")
});

static RESOURCE_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(?P<kind>conversations|executions)/[^/]+").expect("valid resource regex")
});

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("recap_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record the terminal outcome of one execution
pub fn record_execution(status: &str, stage: &str, kind: &str, duration: Duration) {
    let labels = [
        ("status", status.to_string()),
        ("stage", stage.to_string()),
        ("kind", kind.to_string()),
    ];

    counter!("recap_executions_total", &labels).increment(1);
    histogram!("recap_execution_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());
}

/// Record the duration of one stage run
pub fn record_stage(stage: &str, duration: Duration) {
    histogram!("recap_stage_duration_seconds", "stage" => stage.to_string())
        .record(duration.as_secs_f64());
}

/// Record one inference call
pub fn record_inference(family: &str, success: bool, duration: Duration) {
    let labels = [
        ("family", family.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];

    counter!("recap_inference_requests_total", &labels).increment(1);
    histogram!("recap_inference_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Collapse identifiers in a request path to keep label cardinality bounded
fn sanitize_path(path: &str) -> String {
    let path = RESOURCE_SEGMENT.replace_all(path, "/${kind}/{id}");
    let path = UUID_SEGMENT.replace_all(&path, "{id}");

    if path.len() > 50 {
        path.chars().take(50).collect()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_execution_uuid() {
        let path = "/v1/executions/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/v1/executions/{id}");
    }

    #[test]
    fn test_sanitize_path_conversation_id() {
        let path = "/v1/conversations/user-42%20chat/messages";
        assert_eq!(sanitize_path(path), "/v1/conversations/{id}/messages");
    }

    #[test]
    fn test_sanitize_path_arbitrary_execution_id() {
        assert_eq!(sanitize_path("/v1/executions/missing"), "/v1/executions/{id}");
        assert_eq!(sanitize_path("/v1/executions/abc"), "/v1/executions/{id}");
    }

    #[test]
    fn test_sanitize_path_no_id() {
        assert_eq!(sanitize_path("/health"), "/health");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= 50);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_execution("success", "none", "none", Duration::from_millis(3));
        record_stage("querying", Duration::from_millis(1));
        record_inference("titan", false, Duration::from_millis(2));
    }
}
