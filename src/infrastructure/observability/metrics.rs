//! Prometheus metrics infrastructure

use std::sync::Arc;

use metrics::{describe_counter, describe_histogram, gauge, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Handle to the installed Prometheus recorder
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish()
    }
}

impl PrometheusMetrics {
    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Current metrics in the Prometheus text exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Returns `None` when disabled or when a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_metrics();
            tracing::debug!("Prometheus metrics initialized");

            Some(PrometheusMetrics::from_handle(handle))
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Register descriptions for every metric the crate emits
pub fn describe_metrics() {
    describe_counter!("llm_requests_total", "Provider attempts by provider and status");
    describe_histogram!(
        "llm_request_duration_seconds",
        Unit::Seconds,
        "Latency of single provider attempts"
    );
    describe_counter!("llm_tokens_total", "Tokens consumed by successful generations");
    describe_counter!("llm_errors_total", "Failed provider attempts by error kind");
    describe_counter!("llm_circuit_open_total", "Provider attempts skipped by an open circuit");
    describe_counter!("llm_exhausted_total", "Generations that failed on every provider");
    describe_counter!("rag_answers_total", "Grounded answers by outcome");
    describe_histogram!("rag_grounding_score", "Grounding score of generated answers");

    gauge!("agri_rag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics::{counter, histogram};

    #[test]
    fn test_render_recorded_metrics() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let prometheus = PrometheusMetrics::from_handle(recorder.handle());

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            counter!("rag_answers_total", "outcome" => "generated").increment(2);
            histogram!("rag_grounding_score").record(0.75);
        });

        let output = prometheus.render();

        assert!(output.contains("rag_answers_total{outcome=\"generated\"} 2"));
        assert!(output.contains("# HELP rag_answers_total Grounded answers by outcome"));
        assert!(output.contains("rag_grounding_score"));
        assert!(output.contains("agri_rag_info"));
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        let config = MetricsConfig { enabled: false };
        assert!(init_metrics(&config).is_none());
    }
}
