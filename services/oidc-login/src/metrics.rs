//! Prometheus metrics exposition
//!
//! - `oidc_callbacks_total` (counter): label `outcome`
//! - `oidc_callback_duration_seconds` (histogram): label `outcome`
//! - `oidc_provider_errors_total` (counter): labels `stage`, `kind`

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const CALLBACK_DURATION: &str = "oidc_callback_duration_seconds";

/// Callback round trips are two provider calls; buckets span 10ms to 30s.
const CALLBACK_BUCKETS: &[f64] = &[0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0];

fn builder() -> Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(CALLBACK_DURATION.to_string()), CALLBACK_BUCKETS)
        .context("failed to set histogram buckets")
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle> {
    builder()?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Record a finished `/callback` with its outcome (`success`, `denied`,
/// `token_error`, `userinfo_error`).
pub fn record_callback(outcome: &'static str, duration_secs: f64) {
    metrics::counter!("oidc_callbacks_total", "outcome" => outcome).increment(1);
    metrics::histogram!(CALLBACK_DURATION, "outcome" => outcome).record(duration_secs);
}

/// Record a provider call failure. `stage` is `token` or `userinfo`; `kind`
/// comes from `oidc_client::Error::kind`.
pub fn record_provider_error(stage: &'static str, kind: &'static str) {
    metrics::counter!("oidc_provider_errors_total", "stage" => stage, "kind" => kind)
        .increment(1);
}
