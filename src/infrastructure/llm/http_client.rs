use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::LlmError;

/// Transport-level failure of a JSON POST
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl HttpError {
    /// Classify into the gateway taxonomy: 429 is a rate limit, 408/504 and
    /// client timeouts are timeouts, everything else is a provider error
    pub fn into_llm_error(self, provider: &str) -> LlmError {
        match &self {
            Self::Status { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
                LlmError::rate_limit(provider, self.to_string())
            }
            Self::Status { status, .. }
                if *status == StatusCode::REQUEST_TIMEOUT.as_u16()
                    || *status == StatusCode::GATEWAY_TIMEOUT.as_u16() =>
            {
                LlmError::timeout(provider, self.to_string())
            }
            Self::Timeout(_) => LlmError::timeout(provider, self.to_string()),
            _ => LlmError::provider(provider, self.to_string()),
        }
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn send_error(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout(error.to_string())
    } else {
        HttpError::Transport(error.to_string())
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, HttpError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.json(body).send().await.map_err(send_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HttpError::Status { status, body });
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(e.to_string())
            } else {
                HttpError::Decode(e.to_string())
            }
        })
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Recorded call to the mock client
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: serde_json::Value,
    }

    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, serde_json::Value>>,
        errors: RwLock<HashMap<String, HttpError>>,
        requests: RwLock<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: HttpError) -> Self {
            self.errors.write().unwrap().insert(url.into(), error);
            self
        }

        pub fn last_request(&self) -> Option<RecordedRequest> {
            self.requests.read().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, HttpError> {
            self.requests.write().unwrap().push(RecordedRequest {
                url: url.to_string(),
                headers: headers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.clone(),
            });

            if let Some(error) = self.errors.read().unwrap().get(url) {
                return Err(error.clone());
            }

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| HttpError::Transport(format!("No mock response for {}", url)))
        }
    }
}
