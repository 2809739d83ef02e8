//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use self::metrics::{describe_metrics, init_metrics, PrometheusMetrics};
