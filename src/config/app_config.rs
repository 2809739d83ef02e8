use std::time::Duration;

use serde::Deserialize;

use crate::domain::gateway::{CircuitBreakerConfig, GatewayConfig, RetryPolicy};
use crate::domain::grounding::GroundingConfig;
use crate::domain::retrieval::{RetrievalConfig, DEFAULT_COLLECTIONS};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub gateway: GatewaySettings,
    pub providers: ProvidersConfig,
    pub retrieval: RetrievalSettings,
    pub grounding: GroundingSettings,
    pub document_store: DocumentStoreConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Gateway values as they appear in configuration files
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    pub primary_provider: String,
    pub fallback_provider: String,
    pub max_retries: u32,
    pub retry_base_delay_seconds: f64,
    pub retry_max_delay_seconds: f64,
    pub provider_timeout_seconds: u64,
    pub circuit_failure_threshold: u32,
    pub circuit_cooldown_seconds: u64,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            primary_provider: "openai".to_string(),
            fallback_provider: "anthropic".to_string(),
            max_retries: 2,
            retry_base_delay_seconds: 1.0,
            retry_max_delay_seconds: 30.0,
            provider_timeout_seconds: 30,
            circuit_failure_threshold: 3,
            circuit_cooldown_seconds: 300,
            default_max_tokens: 1000,
            default_temperature: 0.7,
        }
    }
}

impl GatewaySettings {
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            primary_provider: self.primary_provider.clone(),
            fallback_provider: self.fallback_provider.clone(),
            retry: RetryPolicy::new(self.max_retries)
                .with_base_delay(seconds(self.retry_base_delay_seconds))
                .with_max_delay(seconds(self.retry_max_delay_seconds)),
            provider_timeout: Duration::from_secs(self.provider_timeout_seconds),
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: self.circuit_failure_threshold.max(1),
                cooldown: Duration::from_secs(self.circuit_cooldown_seconds),
            },
            default_max_tokens: self.default_max_tokens,
            default_temperature: self.default_temperature,
        }
    }
}

/// Negative or NaN values clamp to zero, values too large for `Duration` to `Duration::MAX`
fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::with_model("gpt-3.5-turbo"),
            anthropic: ProviderSettings::with_model("claude-3-haiku-20240307"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: String,
}

impl ProviderSettings {
    fn with_model(model: &str) -> Self {
        Self {
            default_model: model.to_string(),
            ..Default::default()
        }
    }

    /// Configured key, else the given environment variable; blank keys count as absent
    pub fn resolve_api_key(&self, env_var: &str) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(env_var).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub collections: Vec<String>,
    pub min_similarity_threshold: f32,
    /// Default for callers outside the answer pipeline
    pub api_similarity_threshold: f32,
    pub default_top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            collections: DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
            min_similarity_threshold: 0.3,
            api_similarity_threshold: 0.7,
            default_top_k: 5,
        }
    }
}

impl RetrievalSettings {
    pub fn to_retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            collections: self.collections.clone(),
            min_similarity_threshold: self.min_similarity_threshold,
            default_top_k: self.default_top_k,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroundingSettings {
    pub max_context_length_chars: usize,
    pub temperature: f32,
}

impl Default for GroundingSettings {
    fn default() -> Self {
        let defaults = GroundingConfig::default();
        Self {
            max_context_length_chars: defaults.max_context_length_chars,
            temperature: defaults.temperature,
        }
    }
}

impl GroundingSettings {
    pub fn to_grounding_config(&self) -> GroundingConfig {
        GroundingConfig {
            max_context_length_chars: self.max_context_length_chars,
            temperature: self.temperature,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentStoreConfig {
    /// `in_memory` or `json_file`
    pub backend: String,
    pub seed_path: Option<String>,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            seed_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("retrieval.collections"),
            )
            .build()?;

        config.try_deserialize()
    }
}
