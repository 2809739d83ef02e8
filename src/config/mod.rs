//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, DocumentStoreConfig, GatewaySettings, GroundingSettings, LogFormat, LoggingConfig,
    MetricsConfig, ProviderSettings, ProvidersConfig, RetrievalSettings,
};
