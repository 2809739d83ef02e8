//! Agricultural knowledge core
//!
//! Answers farmer questions from retrieved documents with:
//! - A multi-provider LLM gateway with circuit breakers, retries and failover
//! - Concurrent retrieval across document collections
//! - Grounded answer generation with citation and hallucination checks

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use domain::{LlmGateway, ResponseGrounder, RetrievalCoordinator};
use infrastructure::document_store::DocumentStoreFactory;
use infrastructure::llm::LlmProviderFactory;
use infrastructure::observability::{init_metrics, PrometheusMetrics};
use infrastructure::services::KnowledgeService;

/// Every long-lived component, built once at startup
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub gateway: Arc<LlmGateway>,
    pub coordinator: Arc<RetrievalCoordinator>,
    pub grounder: Arc<ResponseGrounder>,
    pub knowledge: Arc<KnowledgeService>,
    pub metrics: Option<PrometheusMetrics>,
}

impl AppContext {
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let metrics = init_metrics(&config.metrics);

        let gateway_config = config.gateway.to_gateway_config();
        let request_timeout = gateway_config.provider_timeout.max(Duration::from_secs(1));
        let mut gateway = LlmGateway::new(gateway_config);

        for provider in LlmProviderFactory::from_config(&config.providers, request_timeout)? {
            gateway.register(provider);
        }

        if gateway.available_providers().is_empty() {
            warn!("No LLM providers configured, answers will use the template fallback");
        }

        let store = DocumentStoreFactory::from_config(&config.document_store).await?;
        info!(backend = store.backend_name(), "Document store ready");

        let gateway = Arc::new(gateway);
        let coordinator = Arc::new(RetrievalCoordinator::new(
            store,
            config.retrieval.to_retrieval_config(),
        ));
        let grounder = Arc::new(ResponseGrounder::new(
            gateway.clone(),
            config.grounding.to_grounding_config(),
        ));
        let knowledge = Arc::new(KnowledgeService::new(
            coordinator.clone(),
            grounder.clone(),
            config.retrieval.api_similarity_threshold,
        ));

        info!(
            providers = ?gateway.available_providers(),
            collections = config.retrieval.collections.len(),
            "Application context initialized"
        );

        Ok(Self {
            config,
            gateway,
            coordinator,
            grounder,
            knowledge,
            metrics,
        })
    }

    /// Log the final gateway metrics and release every component
    pub async fn shutdown(self) {
        let snapshot = self.gateway.metrics().await;

        info!(
            total_requests = snapshot.metrics.total_requests,
            successful_requests = snapshot.metrics.successful_requests,
            failed_requests = snapshot.metrics.failed_requests,
            total_tokens = snapshot.metrics.total_tokens_used,
            "Shutting down"
        );
    }
}
