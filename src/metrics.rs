//! Prometheus metrics.
//!
//! HTTP request metrics come from [`metrics_middleware`]; the auth service
//! reports business events through the `track_*` helpers. Without an
//! installed recorder the `metrics` macros are no-ops, so tests and the CLI
//! can call the helpers freely.
//!
//! Set `OBSERVABILITY_ENABLED=false` to skip installing the exporter.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::error;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0,
];

pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `None` when observability is disabled or the recorder cannot be
/// installed (for instance because another one already is).
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_observability_enabled() {
        return None;
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .and_then(|builder| builder.install_recorder());

    let handle = match handle {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to install Prometheus recorder");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(latency);
    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router exposing the scrape endpoint.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// A token was issued by `operation` (`register` or `login`).
pub fn track_token_issued(operation: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("tokens_issued_total", "operation" => operation).increment(1);
}

/// An operation was refused; `reason` is the failure kind.
pub fn track_auth_failure(operation: &'static str, reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_failures_total", "operation" => operation, "reason" => reason).increment(1);
}

pub fn track_role_assigned(role: &str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("role_assignments_total", "role" => role.to_string()).increment(1);
}
