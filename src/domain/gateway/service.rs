//! LLM gateway service: provider ordering, retry with backoff, circuit breaking and metrics

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::circuit_breaker::{Admission, CircuitBreaker, CircuitBreakerConfig, CircuitState};
use super::health::{HealthReport, ProviderHealth};
use super::metrics::{emit_attempt, emit_circuit_skip, GatewayMetrics, MetricsSnapshot};
use super::{CircuitSnapshot, RetryPolicy};
use crate::domain::llm::{
    AttemptOutcome, Completion, CompletionRequest, GenerationRequest, GenerationResult, LlmError,
    ProviderClient,
};

const HEALTH_CHECK_PROMPT: &str = "Hello, this is a health check. Please respond with 'OK'.";

/// Configuration for the gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub primary_provider: String,
    pub fallback_provider: String,
    pub retry: RetryPolicy,
    /// Deadline for a single provider call
    pub provider_timeout: Duration,
    pub circuit_breaker: CircuitBreakerConfig,
    pub default_max_tokens: u32,
    pub default_temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            primary_provider: "openai".to_string(),
            fallback_provider: "anthropic".to_string(),
            retry: RetryPolicy::default(),
            provider_timeout: Duration::from_secs(30),
            circuit_breaker: CircuitBreakerConfig::default(),
            default_max_tokens: 1000,
            default_temperature: 0.7,
        }
    }
}

/// Multi-provider text generation gateway
pub struct LlmGateway {
    config: GatewayConfig,
    providers: HashMap<String, Arc<dyn ProviderClient>>,
    /// Registration order, for deterministic listing
    provider_ids: Vec<String>,
    circuit_breakers: HashMap<String, Mutex<CircuitBreaker>>,
    metrics: RwLock<GatewayMetrics>,
}

impl std::fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmGateway")
            .field("config", &self.config)
            .field("providers", &self.provider_ids)
            .finish()
    }
}

impl LlmGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            providers: HashMap::new(),
            provider_ids: Vec::new(),
            circuit_breakers: HashMap::new(),
            metrics: RwLock::new(GatewayMetrics::default()),
        }
    }

    /// Register a provider client; replaces any client with the same id
    pub fn with_provider(mut self, client: Arc<dyn ProviderClient>) -> Self {
        self.register(client);
        self
    }

    pub fn register(&mut self, client: Arc<dyn ProviderClient>) {
        let id = client.provider_id().to_string();

        if !self.providers.contains_key(&id) {
            self.provider_ids.push(id.clone());
        }

        self.circuit_breakers.insert(
            id.clone(),
            Mutex::new(CircuitBreaker::new(self.config.circuit_breaker)),
        );
        self.providers.insert(id.clone(), client);
        info!(provider = %id, "LLM provider registered");
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn available_providers(&self) -> Vec<String> {
        self.provider_ids.clone()
    }

    /// Generate text, failing over between providers.
    ///
    /// A registered `preferred_provider` whose circuit is not open is used
    /// exclusively; otherwise the configured primary then fallback are tried.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        preferred_provider: Option<&str>,
    ) -> Result<GenerationResult, LlmError> {
        self.metrics.write().await.record_request();

        let candidates = self.candidate_order(preferred_provider).await;
        let completion_request = CompletionRequest::from_generation(
            request,
            self.config.default_max_tokens,
            self.config.default_temperature,
        );

        let mut last_error = None;

        for provider_id in candidates {
            let (Some(client), Some(breaker)) = (
                self.providers.get(&provider_id),
                self.circuit_breakers.get(&provider_id),
            ) else {
                warn!(provider = %provider_id, "Provider not available");
                continue;
            };

            let admission = breaker.lock().await.try_acquire(Instant::now());
            let max_attempts = match admission {
                Admission::Rejected => {
                    warn!(provider = %provider_id, "Circuit breaker open, skipping provider");
                    emit_circuit_skip(&provider_id);
                    continue;
                }
                Admission::Probe => {
                    info!(provider = %provider_id, "Circuit breaker half-open, sending probe");
                    1
                }
                Admission::Allowed => self.config.retry.max_attempts(),
            };

            info!(provider = %provider_id, "Attempting LLM request");

            match self
                .generate_with_retry(client.as_ref(), &completion_request, max_attempts)
                .await
            {
                Ok((completion, latency)) => {
                    breaker.lock().await.record_success();

                    let result = GenerationResult::from_completion(
                        completion,
                        provider_id.as_str(),
                        latency,
                        request.metadata().clone(),
                    );

                    self.metrics
                        .write()
                        .await
                        .record_success(&provider_id, result.tokens_used, latency);

                    info!(
                        provider = %provider_id,
                        model = %result.model,
                        tokens = result.tokens_used,
                        latency_ms = latency.as_millis() as u64,
                        "LLM request successful"
                    );

                    return Ok(result);
                }
                Err(err) => {
                    let opened = breaker.lock().await.record_failure(Instant::now());

                    if opened {
                        warn!(
                            provider = %provider_id,
                            "Circuit breaker opened due to consecutive failures"
                        );
                    }

                    self.metrics.write().await.record_error(&err);
                    error!(provider = %provider_id, error = %err, "LLM request failed");
                    last_error = Some(err);
                }
            }
        }

        self.metrics.write().await.record_exhausted();

        Err(LlmError::exhausted(last_error))
    }

    async fn candidate_order(&self, preferred_provider: Option<&str>) -> Vec<String> {
        if let Some(preferred) = preferred_provider {
            match self.circuit_breakers.get(preferred) {
                Some(breaker) => {
                    let state = breaker.lock().await.effective_state(Instant::now());

                    if state != CircuitState::Open {
                        return vec![preferred.to_string()];
                    }

                    warn!(
                        provider = %preferred,
                        "Preferred provider circuit open, using configured order"
                    );
                }
                None => {
                    warn!(
                        provider = %preferred,
                        "Preferred provider not registered, using configured order"
                    );
                }
            }
        }

        let mut order = vec![self.config.primary_provider.clone()];

        if self.config.fallback_provider != self.config.primary_provider {
            order.push(self.config.fallback_provider.clone());
        }

        order
    }

    /// Returns the completion and the latency of the successful attempt
    async fn generate_with_retry(
        &self,
        client: &dyn ProviderClient,
        request: &CompletionRequest,
        max_attempts: u32,
    ) -> Result<(Completion, Duration), LlmError> {
        let mut attempt = 0;

        loop {
            let started = Instant::now();

            match self.attempt(client, request).await {
                AttemptOutcome::Success(completion) => {
                    return Ok((completion, started.elapsed()));
                }
                AttemptOutcome::Permanent(err) => return Err(err),
                AttemptOutcome::Transient(err) => {
                    if attempt + 1 >= max_attempts {
                        return Err(err);
                    }

                    let delay = self.config.retry.delay_for_attempt(attempt);
                    warn!(
                        provider = client.provider_id(),
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient LLM failure, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(
        &self,
        client: &dyn ProviderClient,
        request: &CompletionRequest,
    ) -> AttemptOutcome {
        let (result, elapsed) = self.call_with_timeout(client, request).await;
        let outcome = AttemptOutcome::from(result);

        let status = match &outcome {
            AttemptOutcome::Success(_) => Ok(()),
            AttemptOutcome::Transient(err) | AttemptOutcome::Permanent(err) => Err(err),
        };
        emit_attempt(client.provider_id(), status, elapsed);

        outcome
    }

    async fn call_with_timeout(
        &self,
        client: &dyn ProviderClient,
        request: &CompletionRequest,
    ) -> (Result<Completion, LlmError>, Duration) {
        let started = Instant::now();
        let timeout = self.config.provider_timeout;

        let result = match tokio::time::timeout(timeout, client.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::timeout(
                client.provider_id(),
                format!("no response within {}s", timeout.as_secs_f64()),
            )),
        };

        (result, started.elapsed())
    }

    /// Current metrics with circuit and provider state
    pub async fn metrics(&self) -> MetricsSnapshot {
        let metrics = self.metrics.read().await.clone();

        MetricsSnapshot {
            success_rate: metrics.success_rate(),
            metrics,
            circuit_breaker_state: self.circuit_states().await,
            available_providers: self.available_providers(),
        }
    }

    /// Reset the metrics aggregate; circuit state is left untouched
    pub async fn reset_metrics(&self) {
        *self.metrics.write().await = GatewayMetrics::default();
        info!("LLM gateway metrics reset");
    }

    pub async fn circuit_states(&self) -> BTreeMap<String, CircuitSnapshot> {
        let now = Instant::now();
        let mut states = BTreeMap::new();

        for (id, breaker) in &self.circuit_breakers {
            states.insert(id.clone(), breaker.lock().await.snapshot(now));
        }

        states
    }

    /// Probe every registered provider directly, bypassing retry and circuit accounting
    pub async fn health_check(&self) -> HealthReport {
        let probe = CompletionRequest {
            prompt: HEALTH_CHECK_PROMPT.to_string(),
            system_message: None,
            max_tokens: 10,
            temperature: 0.0,
            model: None,
        };

        let mut providers = BTreeMap::new();

        for id in &self.provider_ids {
            let (Some(client), Some(breaker)) =
                (self.providers.get(id), self.circuit_breakers.get(id))
            else {
                continue;
            };

            let state = breaker.lock().await.effective_state(Instant::now());

            if state == CircuitState::Open {
                providers.insert(id.clone(), ProviderHealth::circuit_open());
                continue;
            }

            let health = match self.call_with_timeout(client.as_ref(), &probe).await {
                (Ok(completion), elapsed) => {
                    ProviderHealth::healthy(elapsed.as_secs_f64(), completion.model_used)
                }
                (Err(err), _) => {
                    warn!(provider = %id, error = %err, "Provider health check failed");
                    ProviderHealth::unhealthy(err.to_string())
                }
            };

            providers.insert(id.clone(), health);
        }

        HealthReport::from_providers(providers)
    }
}
