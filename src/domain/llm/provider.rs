use async_trait::async_trait;
use std::fmt::Debug;

use super::{Completion, CompletionRequest, LlmError};

/// Uniform call contract to one upstream text-generation backend
#[async_trait]
pub trait ProviderClient: Send + Sync + Debug {
    /// Identifier used in gateway configuration (e.g. "openai")
    fn provider_id(&self) -> &str;

    /// Run one completion; errors are already normalized to the gateway taxonomy
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that replays a scripted sequence of outcomes.
    ///
    /// Once the script is drained the last configured fallback is returned.
    #[derive(Debug)]
    pub struct MockProviderClient {
        id: String,
        script: Mutex<VecDeque<Result<Completion, LlmError>>>,
        fallback: Result<Completion, LlmError>,
        calls: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockProviderClient {
        pub fn new(id: impl Into<String>) -> Self {
            let id = id.into();
            let fallback = Ok(Completion::new(
                format!("response from {}", id),
                format!("{}-model", id),
                10,
            ));

            Self {
                id,
                script: Mutex::new(VecDeque::new()),
                fallback,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn succeeding(id: impl Into<String>, text: impl Into<String>) -> Self {
            let mock = Self::new(id);
            let model = format!("{}-model", mock.id);
            mock.always(Ok(Completion::new(text, model, 10)))
        }

        pub fn failing(id: impl Into<String>, error: LlmError) -> Self {
            Self::new(id).always(Err(error))
        }

        pub fn always(mut self, outcome: Result<Completion, LlmError>) -> Self {
            self.fallback = outcome;
            self
        }

        pub fn then(self, outcome: Result<Completion, LlmError>) -> Self {
            self.script.lock().unwrap().push_back(outcome);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<CompletionRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl ProviderClient for MockProviderClient {
        fn provider_id(&self) -> &str {
            &self.id
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());

            let scripted = self.script.lock().unwrap().pop_front();
            scripted.unwrap_or_else(|| self.fallback.clone())
        }
    }
}
