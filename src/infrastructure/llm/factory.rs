use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::http_client::HttpClient;
use super::{AnthropicProvider, OpenAiProvider};
use crate::config::{ProviderSettings, ProvidersConfig};
use crate::domain::{DomainError, ProviderClient};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Factory for creating provider clients from configuration
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Build every provider that has an API key.
    ///
    /// `request_timeout` bounds the HTTP call itself; the gateway applies its
    /// own deadline on top.
    pub fn from_config(
        config: &ProvidersConfig,
        request_timeout: Duration,
    ) -> Result<Vec<Arc<dyn ProviderClient>>, DomainError> {
        let http_client = HttpClient::with_timeout(request_timeout)
            .map_err(|e| DomainError::configuration(e.to_string()))?;

        let mut providers: Vec<Arc<dyn ProviderClient>> = Vec::new();

        match config.openai.resolve_api_key(OPENAI_API_KEY_ENV) {
            Some(api_key) => {
                providers.push(Self::create_openai(http_client.clone(), api_key, &config.openai));
                info!("OpenAI provider configured");
            }
            None => warn!("OpenAI API key not set, provider disabled"),
        }

        match config.anthropic.resolve_api_key(ANTHROPIC_API_KEY_ENV) {
            Some(api_key) => {
                providers.push(Self::create_anthropic(http_client, api_key, &config.anthropic));
                info!("Anthropic provider configured");
            }
            None => warn!("Anthropic API key not set, provider disabled"),
        }

        Ok(providers)
    }

    /// Create an OpenAI provider
    pub fn create_openai(
        client: HttpClient,
        api_key: impl Into<String>,
        settings: &ProviderSettings,
    ) -> Arc<dyn ProviderClient> {
        let mut provider = match &settings.base_url {
            Some(base_url) => OpenAiProvider::with_base_url(client, api_key, base_url),
            None => OpenAiProvider::new(client, api_key),
        };

        if let Some(model) = configured_model(settings) {
            provider = provider.with_default_model(model);
        }

        Arc::new(provider)
    }

    /// Create an Anthropic provider
    pub fn create_anthropic(
        client: HttpClient,
        api_key: impl Into<String>,
        settings: &ProviderSettings,
    ) -> Arc<dyn ProviderClient> {
        let mut provider = match &settings.base_url {
            Some(base_url) => AnthropicProvider::with_base_url(client, api_key, base_url),
            None => AnthropicProvider::new(client, api_key),
        };

        if let Some(model) = configured_model(settings) {
            provider = provider.with_default_model(model);
        }

        Arc::new(provider)
    }
}

fn configured_model(settings: &ProviderSettings) -> Option<&str> {
    Some(settings.default_model.trim()).filter(|model| !model.is_empty())
}
