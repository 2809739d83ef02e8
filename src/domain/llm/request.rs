use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Parameters for a gateway generation call
///
/// Built through [`GenerationRequestBuilder`]; fields are read-only afterwards.
/// Deserialization runs the same checks as [`GenerationRequestBuilder::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GenerationRequestBuilder")]
pub struct GenerationRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    metadata: HashMap<String, serde_json::Value>,
}

impl GenerationRequest {
    pub fn builder(prompt: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(prompt)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn system_message(&self) -> Option<&str> {
        self.system_message.as_deref()
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn metadata(&self) -> &HashMap<String, serde_json::Value> {
        &self.metadata
    }
}

/// Builder for GenerationRequest
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerationRequestBuilder {
    prompt: String,
    system_message: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    model: Option<String>,
    metadata: HashMap<String, serde_json::Value>,
}

impl GenerationRequestBuilder {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn system(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Result<GenerationRequest, DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(DomainError::validation("prompt must not be empty"));
        }

        if let Some(temp) = self.temperature {
            if !(0.0..=1.0).contains(&temp) {
                return Err(DomainError::validation(format!(
                    "temperature must be within 0.0..=1.0, got {}",
                    temp
                )));
            }
        }

        Ok(GenerationRequest {
            prompt: self.prompt,
            system_message: self.system_message,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            model: self.model,
            metadata: self.metadata,
        })
    }
}

impl TryFrom<GenerationRequestBuilder> for GenerationRequest {
    type Error = DomainError;

    fn try_from(builder: GenerationRequestBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// Fully resolved call handed to a provider client
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_message: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Resolve optional request fields against gateway defaults
    pub fn from_generation(
        request: &GenerationRequest,
        default_max_tokens: u32,
        default_temperature: f32,
    ) -> Self {
        Self {
            prompt: request.prompt.clone(),
            system_message: request.system_message.clone(),
            max_tokens: request.max_tokens.unwrap_or(default_max_tokens),
            temperature: request.temperature.unwrap_or(default_temperature),
            model: request.model.clone(),
        }
    }
}
