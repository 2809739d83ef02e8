//! Provider clients for upstream text-generation APIs

mod anthropic;
mod factory;
mod http_client;
mod openai;

pub use anthropic::{AnthropicProvider, DEFAULT_ANTHROPIC_MODEL};
pub use factory::{LlmProviderFactory, ANTHROPIC_API_KEY_ENV, OPENAI_API_KEY_ENV};
pub use http_client::{HttpClient, HttpClientTrait, HttpError};
pub use openai::{OpenAiProvider, DEFAULT_OPENAI_MODEL};
