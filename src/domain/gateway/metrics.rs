//! Running gateway metrics aggregate
//!
//! Counters are also mirrored to the `metrics` facade so an installed
//! Prometheus recorder picks them up.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use metrics::{counter, histogram};
use serde::Serialize;

use super::CircuitSnapshot;
use crate::domain::llm::LlmError;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GatewayMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_tokens_used: u64,
    /// Running mean over successful requests, in seconds
    pub average_response_time: f64,
    pub provider_usage: HashMap<String, u64>,
    pub error_counts: HashMap<String, u64>,
}

impl GatewayMetrics {
    pub fn record_request(&mut self) {
        self.total_requests += 1;
    }

    pub fn record_success(&mut self, provider: &str, tokens: u32, latency: Duration) {
        self.successful_requests += 1;
        self.total_tokens_used += u64::from(tokens);
        *self.provider_usage.entry(provider.to_string()).or_insert(0) += 1;

        let n = self.successful_requests as f64;
        self.average_response_time =
            (self.average_response_time * (n - 1.0) + latency.as_secs_f64()) / n;

        counter!("llm_tokens_total", "provider" => provider.to_string()).increment(u64::from(tokens));
    }

    /// Tally a provider-level failure by error kind
    pub fn record_error(&mut self, error: &LlmError) {
        *self.error_counts.entry(error.kind().to_string()).or_insert(0) += 1;
    }

    pub fn record_exhausted(&mut self) {
        self.failed_requests += 1;
        counter!("llm_exhausted_total").increment(1);
    }

    pub fn success_rate(&self) -> f64 {
        self.successful_requests as f64 / self.total_requests.max(1) as f64
    }
}

/// Metrics plus circuit and registration state, as reported to callers
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    #[serde(flatten)]
    pub metrics: GatewayMetrics,
    pub success_rate: f64,
    pub circuit_breaker_state: BTreeMap<String, CircuitSnapshot>,
    pub available_providers: Vec<String>,
}

/// Mirror a single provider attempt to the metrics facade
pub(crate) fn emit_attempt(provider: &str, outcome: Result<(), &LlmError>, duration: Duration) {
    let status = if outcome.is_ok() { "success" } else { "error" };
    let labels = [
        ("provider", provider.to_string()),
        ("status", status.to_string()),
    ];

    counter!("llm_requests_total", &labels).increment(1);
    histogram!("llm_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if let Err(error) = outcome {
        counter!(
            "llm_errors_total",
            "provider" => provider.to_string(),
            "kind" => error.kind()
        )
        .increment(1);
    }
}

pub(crate) fn emit_circuit_skip(provider: &str) {
    counter!("llm_circuit_open_total", "provider" => provider.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average_latency() {
        let mut metrics = GatewayMetrics::default();

        metrics.record_request();
        metrics.record_success("openai", 100, Duration::from_secs(1));
        metrics.record_request();
        metrics.record_success("openai", 50, Duration::from_secs(3));
        metrics.record_request();
        metrics.record_success("anthropic", 25, Duration::from_secs(2));

        assert_eq!(metrics.successful_requests, 3);
        assert_eq!(metrics.total_tokens_used, 175);
        assert!((metrics.average_response_time - 2.0).abs() < 1e-9);
        assert_eq!(metrics.provider_usage.get("openai"), Some(&2));
        assert_eq!(metrics.provider_usage.get("anthropic"), Some(&1));
    }

    #[test]
    fn test_error_tally_by_kind() {
        let mut metrics = GatewayMetrics::default();

        metrics.record_error(&LlmError::timeout("openai", "slow"));
        metrics.record_error(&LlmError::timeout("anthropic", "slow"));
        metrics.record_error(&LlmError::provider("openai", "bad key"));

        assert_eq!(metrics.error_counts.get("timeout_error"), Some(&2));
        assert_eq!(metrics.error_counts.get("provider_error"), Some(&1));
    }

    #[test]
    fn test_success_rate_with_no_requests() {
        let metrics = GatewayMetrics::default();
        assert_eq!(metrics.success_rate(), 0.0);
    }
}
