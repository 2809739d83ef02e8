use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overall gateway health
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderHealthStatus {
    Healthy,
    Unhealthy,
    CircuitBreakerOpen,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealth {
    pub status: ProviderHealthStatus,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderHealth {
    pub fn healthy(response_time: f64, model: impl Into<String>) -> Self {
        Self {
            status: ProviderHealthStatus::Healthy,
            healthy: true,
            response_time: Some(response_time),
            model: Some(model.into()),
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: ProviderHealthStatus::Unhealthy,
            healthy: false,
            response_time: None,
            model: None,
            error: Some(error.into()),
        }
    }

    pub fn circuit_open() -> Self {
        Self {
            status: ProviderHealthStatus::CircuitBreakerOpen,
            healthy: false,
            response_time: None,
            model: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub providers: BTreeMap<String, ProviderHealth>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// Degraded when any probe failed, unhealthy when nothing is healthy
    pub fn from_providers(providers: BTreeMap<String, ProviderHealth>) -> Self {
        let any_failed = providers
            .values()
            .any(|p| p.status == ProviderHealthStatus::Unhealthy);
        let any_healthy = providers.values().any(|p| p.healthy);

        let status = if !any_healthy {
            HealthStatus::Unhealthy
        } else if any_failed {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            providers,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_status() {
        let mut providers = BTreeMap::new();
        providers.insert("openai".to_string(), ProviderHealth::healthy(0.4, "gpt-4"));
        providers.insert("anthropic".to_string(), ProviderHealth::circuit_open());
        assert_eq!(
            HealthReport::from_providers(providers.clone()).status,
            HealthStatus::Healthy
        );

        providers.insert("anthropic".to_string(), ProviderHealth::unhealthy("HTTP 500"));
        assert_eq!(
            HealthReport::from_providers(providers).status,
            HealthStatus::Degraded
        );

        assert_eq!(
            HealthReport::from_providers(BTreeMap::new()).status,
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_serialization_shape() {
        let json = serde_json::to_value(ProviderHealth::circuit_open()).unwrap();
        assert_eq!(json["status"], "circuit_breaker_open");
        assert_eq!(json["healthy"], false);
        assert!(json.get("error").is_none());
    }
}
