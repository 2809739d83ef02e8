//! Text-generation domain models and the provider client contract

mod error;
mod provider;
mod request;
mod response;

pub use error::{AttemptOutcome, LlmError};
pub use provider::ProviderClient;
pub use request::{CompletionRequest, GenerationRequest, GenerationRequestBuilder};
pub use response::{Completion, GenerationResult};

#[cfg(test)]
pub use provider::mock::MockProviderClient;
