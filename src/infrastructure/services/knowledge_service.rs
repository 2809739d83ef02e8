//! Knowledge service - retrieval, grounded answers, ingestion and stats

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::gateway::{HealthReport, LlmGateway, MetricsSnapshot};
use crate::domain::grounding::{GroundedAnswer, ResponseGrounder, ResponseType};
use crate::domain::llm::{GenerationRequest, GenerationResult, LlmError};
use crate::domain::retrieval::{
    ingest_documents, IngestionReport, MetadataFilter, RetrievalCoordinator, RetrievalQuery,
    RetrievedDocument, StoredDocument,
};
use crate::domain::DomainError;

/// Request to answer a question from the knowledge base
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub query: String,
    pub collections: Option<Vec<String>>,
    pub top_k: Option<usize>,
    pub response_type: ResponseType,
    pub language: String,
    pub filter: Option<MetadataFilter>,
}

impl AnswerRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            collections: None,
            top_k: None,
            response_type: ResponseType::default(),
            language: "en".to_string(),
            filter: None,
        }
    }

    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = Some(collections);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Document counts per collection
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeBaseStats {
    pub collections: BTreeMap<String, usize>,
    pub total_documents: usize,
    /// Collections whose count could not be read
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    pub backend: String,
    pub store_healthy: bool,
    pub generated_at: DateTime<Utc>,
}

/// Gateway and document store health together
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub gateway: HealthReport,
    pub document_store_healthy: bool,
}

/// Entry point for everything that answers questions from the knowledge base
pub struct KnowledgeService {
    coordinator: Arc<RetrievalCoordinator>,
    grounder: Arc<ResponseGrounder>,
    api_similarity_threshold: f32,
}

impl std::fmt::Debug for KnowledgeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeService")
            .field("api_similarity_threshold", &self.api_similarity_threshold)
            .finish()
    }
}

impl KnowledgeService {
    pub fn new(
        coordinator: Arc<RetrievalCoordinator>,
        grounder: Arc<ResponseGrounder>,
        api_similarity_threshold: f32,
    ) -> Self {
        Self {
            coordinator,
            grounder,
            api_similarity_threshold,
        }
    }

    fn gateway(&self) -> &Arc<LlmGateway> {
        self.grounder.gateway()
    }

    /// Retrieve with the internal recall threshold and answer from the hits.
    ///
    /// Never fails; retrieval problems show up as a fallback answer.
    pub async fn search_and_generate(&self, request: &AnswerRequest) -> GroundedAnswer {
        let mut query = RetrievalQuery::new(&request.query);
        query.collections = request.collections.clone();
        query.top_k = request.top_k;
        query.filter = request.filter.clone();

        let documents = self.coordinator.retrieve(&query).await;

        self.grounder
            .answer(
                &request.query,
                &documents,
                request.response_type.clone(),
                &request.language,
            )
            .await
    }

    /// Plain retrieval; an unset threshold uses the stricter API default
    pub async fn retrieve(&self, mut query: RetrievalQuery) -> Vec<RetrievedDocument> {
        if query.similarity_threshold.is_none() {
            query.similarity_threshold = Some(self.api_similarity_threshold);
        }

        self.coordinator.retrieve(&query).await
    }

    /// Raw generation through the gateway, optionally preferring a provider
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        preferred_provider: Option<&str>,
    ) -> Result<GenerationResult, LlmError> {
        self.gateway().generate(request, preferred_provider).await
    }

    pub async fn ingest(
        &self,
        documents: Vec<StoredDocument>,
        collection: &str,
        batch_size: usize,
    ) -> Result<IngestionReport, DomainError> {
        ingest_documents(
            self.coordinator.store().as_ref(),
            documents,
            collection,
            batch_size,
        )
        .await
    }

    pub async fn knowledge_base_stats(&self) -> KnowledgeBaseStats {
        let store = self.coordinator.store();
        let mut collections = BTreeMap::new();
        let mut errors = BTreeMap::new();

        for collection in &self.coordinator.config().collections {
            match store.count(collection).await {
                Ok(count) => {
                    collections.insert(collection.clone(), count);
                }
                Err(err) => {
                    warn!(collection = %collection, error = %err, "Failed to count collection");
                    errors.insert(collection.clone(), err.to_string());
                }
            }
        }

        let total_documents = collections.values().sum();
        info!(total_documents, "Collected knowledge base stats");

        KnowledgeBaseStats {
            collections,
            total_documents,
            errors,
            backend: store.backend_name().to_string(),
            store_healthy: self.store_healthy().await,
            generated_at: Utc::now(),
        }
    }

    pub async fn health(&self) -> ServiceHealth {
        ServiceHealth {
            gateway: self.gateway().health_check().await,
            document_store_healthy: self.store_healthy().await,
        }
    }

    pub async fn metrics(&self) -> MetricsSnapshot {
        self.gateway().metrics().await
    }

    async fn store_healthy(&self) -> bool {
        match self.coordinator.store().health_check().await {
            Ok(healthy) => healthy,
            Err(err) => {
                warn!(error = %err, "Document store health check failed");
                false
            }
        }
    }
}
