//! Generation error taxonomy and per-attempt outcomes

use thiserror::Error;

use super::Completion;

/// Errors raised while generating text through an upstream provider
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Non-transient failure; disqualifies the provider for the current call
    #[error("LLM provider {provider} error: {message}")]
    Provider { provider: String, message: String },

    #[error("LLM provider {provider} timed out: {message}")]
    Timeout { provider: String, message: String },

    #[error("LLM provider {provider} rate limited: {message}")]
    RateLimit { provider: String, message: String },

    /// Every candidate provider was skipped or failed
    #[error("All LLM providers exhausted{}", last_error_suffix(.last_error))]
    AllProvidersExhausted { last_error: Option<Box<LlmError>> },
}

fn last_error_suffix(last_error: &Option<Box<LlmError>>) -> String {
    match last_error {
        Some(error) => format!(": {}", error),
        None => ": no providers available".to_string(),
    }
}

impl LlmError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn rate_limit(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn exhausted(last_error: Option<LlmError>) -> Self {
        Self::AllProvidersExhausted {
            last_error: last_error.map(Box::new),
        }
    }

    /// Timeouts and rate limits are worth retrying against the same provider
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RateLimit { .. })
    }

    /// Stable key used for the error tally in gateway metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Provider { .. } => "provider_error",
            Self::Timeout { .. } => "timeout_error",
            Self::RateLimit { .. } => "rate_limit_error",
            Self::AllProvidersExhausted { .. } => "all_providers_exhausted",
        }
    }

    /// Last error observed before exhaustion, if any
    pub fn last_error(&self) -> Option<&LlmError> {
        match self {
            Self::AllProvidersExhausted { last_error } => last_error.as_deref(),
            _ => None,
        }
    }
}

/// Result of a single provider attempt, classified for the gateway loop
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Completion),
    /// Retry-eligible failure
    Transient(LlmError),
    /// Advance to the next provider without retrying
    Permanent(LlmError),
}

impl From<Result<Completion, LlmError>> for AttemptOutcome {
    fn from(result: Result<Completion, LlmError>) -> Self {
        match result {
            Ok(completion) => Self::Success(completion),
            Err(error) if error.is_transient() => Self::Transient(error),
            Err(error) => Self::Permanent(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::timeout("openai", "deadline").is_transient());
        assert!(LlmError::rate_limit("openai", "429").is_transient());
        assert!(!LlmError::provider("openai", "invalid key").is_transient());
        assert!(!LlmError::exhausted(None).is_transient());
    }

    #[test]
    fn test_outcome_from_result() {
        let completion = Completion::new("ok", "gpt-3.5-turbo", 12);

        assert!(matches!(
            AttemptOutcome::from(Ok(completion)),
            AttemptOutcome::Success(_)
        ));
        assert!(matches!(
            AttemptOutcome::from(Err(LlmError::rate_limit("openai", "slow down"))),
            AttemptOutcome::Transient(_)
        ));
        assert!(matches!(
            AttemptOutcome::from(Err(LlmError::provider("openai", "bad request"))),
            AttemptOutcome::Permanent(_)
        ));
    }

    #[test]
    fn test_exhausted_carries_last_error() {
        let error = LlmError::exhausted(Some(LlmError::timeout("anthropic", "30s elapsed")));

        assert_eq!(error.kind(), "all_providers_exhausted");
        assert!(matches!(error.last_error(), Some(LlmError::Timeout { .. })));
        assert_eq!(
            error.to_string(),
            "All LLM providers exhausted: LLM provider anthropic timed out: 30s elapsed"
        );
    }

    #[test]
    fn test_exhausted_without_last_error() {
        let error = LlmError::exhausted(None);
        assert_eq!(
            error.to_string(),
            "All LLM providers exhausted: no providers available"
        );
    }
}
