//! Metrics collection for provider-service.

use crate::models::Channel;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const OUTCOME_POLICY: &str = "policy";
pub const OUTCOME_DEFAULT: &str = "default";
pub const OUTCOME_UNCONFIGURED: &str = "unconfigured";
pub const OUTCOME_MATCHER_ERROR: &str = "matcher_error";

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if METRICS_HANDLE.set(handle).is_err() {
                tracing::warn!("Metrics handle already set");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count one resolution by channel and where its providers came from.
pub fn record_resolution(channel: Channel, outcome: &'static str) {
    metrics::counter!(
        "provider_resolution_total",
        "channel" => channel.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}
