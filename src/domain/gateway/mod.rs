//! Resilient multi-provider LLM gateway

mod circuit_breaker;
mod health;
mod metrics;
mod retry;
mod service;

pub use circuit_breaker::{
    Admission, CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState,
};
pub use health::{HealthReport, HealthStatus, ProviderHealth, ProviderHealthStatus};
pub use self::metrics::{GatewayMetrics, MetricsSnapshot};
pub use retry::RetryPolicy;
pub use service::{GatewayConfig, LlmGateway};
