use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{Completion, CompletionRequest, LlmError, ProviderClient};

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";
const PROVIDER_ID: &str = "anthropic";

/// Anthropic messages client
#[derive(Debug)]
pub struct AnthropicProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl<C: HttpClientTrait> AnthropicProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key: api_key.into(),
            base_url,
            default_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Map a requested model name onto a Claude model.
    ///
    /// OpenAI-style names get their Claude counterpart, `claude*` names pass
    /// through and anything else uses the default model.
    fn resolve_model<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some("gpt-3.5-turbo") => "claude-3-haiku-20240307",
            Some("gpt-4") => "claude-3-sonnet-20240229",
            Some("gpt-4-turbo") => "claude-3-opus-20240229",
            Some(model) if model.starts_with("claude") => model,
            _ => &self.default_model,
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> serde_json::Value {
        let messages = [AnthropicMessage {
            role: "user",
            content: &request.prompt,
        }];

        let mut body = serde_json::json!({
            "model": self.resolve_model(request.model.as_deref()),
            "messages": messages,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        if let Some(system) = &request.system_message {
            body["system"] = serde_json::json!(system);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Completion, LlmError> {
        let response: AnthropicResponse = serde_json::from_value(json).map_err(|e| {
            LlmError::provider(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })?;

        let text = response
            .content
            .into_iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(Completion::new(
            text,
            response.model,
            response.usage.input_tokens + response.usage.output_tokens,
        ))
    }
}

#[async_trait]
impl<C: HttpClientTrait> ProviderClient for AnthropicProvider<C> {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let url = self.messages_url();
        let body = self.build_request(request);

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| e.into_llm_error(PROVIDER_ID))?;

        self.parse_response(response)
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
