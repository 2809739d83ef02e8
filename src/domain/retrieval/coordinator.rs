//! Multi-collection retrieval with partial-failure tolerance

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{DocumentStore, MetadataFilter, RetrievedDocument, StoreHit};

pub const DEFAULT_COLLECTIONS: [&str; 4] = [
    "agricultural_knowledge",
    "government_schemes",
    "market_intelligence",
    "crop_diseases",
];

/// Retrieval defaults
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Collections searched when a query names none
    pub collections: Vec<String>,
    /// Internal recall-oriented threshold
    pub min_similarity_threshold: f32,
    pub default_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            collections: DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
            min_similarity_threshold: 0.3,
            default_top_k: 5,
        }
    }
}

/// Parameters for one retrieval call
#[derive(Debug, Clone, Default)]
pub struct RetrievalQuery {
    pub text: String,
    pub collections: Option<Vec<String>>,
    pub top_k: Option<usize>,
    pub similarity_threshold: Option<f32>,
    pub filter: Option<MetadataFilter>,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
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

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Queries a document store across collections and merges the ranked hits
pub struct RetrievalCoordinator {
    store: Arc<dyn DocumentStore>,
    config: RetrievalConfig,
}

impl std::fmt::Debug for RetrievalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalCoordinator")
            .field("backend", &self.store.backend_name())
            .field("config", &self.config)
            .finish()
    }
}

impl RetrievalCoordinator {
    pub fn new(store: Arc<dyn DocumentStore>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Retrieve documents ranked by descending similarity.
    ///
    /// Collections are queried concurrently. A failing collection is logged
    /// and contributes no hits; this never returns an error.
    pub async fn retrieve(&self, query: &RetrievalQuery) -> Vec<RetrievedDocument> {
        let collections = query
            .collections
            .as_ref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.config.collections);
        let top_k = query.top_k.unwrap_or(self.config.default_top_k);
        let threshold = query
            .similarity_threshold
            .unwrap_or(self.config.min_similarity_threshold);

        if top_k == 0 {
            return Vec::new();
        }

        let searches = collections.iter().map(|collection| async move {
            let result = self
                .store
                .query(collection, &query.text, top_k, query.filter.clone())
                .await;
            (collection.as_str(), result)
        });

        let retrieved_at = Utc::now().to_rfc3339();
        let mut documents = Vec::new();

        for (collection, result) in join_all(searches).await {
            match result {
                Ok(hits) => {
                    debug!(collection, hits = hits.len(), "Collection searched");
                    documents.extend(
                        hits.into_iter()
                            .enumerate()
                            .map(|(i, hit)| to_retrieved(hit, i, collection, &query.text, &retrieved_at)),
                    );
                }
                Err(err) => {
                    warn!(collection, error = %err, "Collection search failed, skipping");
                }
            }
        }

        documents.retain(|doc| doc.similarity_score >= threshold);
        documents.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
        });
        documents.truncate(top_k);

        info!(
            query = %query.text,
            collections = collections.len(),
            results = documents.len(),
            "Retrieved documents"
        );

        documents
    }
}

fn to_retrieved(
    hit: StoreHit,
    index: usize,
    collection: &str,
    query: &str,
    retrieved_at: &str,
) -> RetrievedDocument {
    let mut metadata = hit.metadata;
    metadata.insert("collection".to_string(), json!(collection));
    metadata.insert("retrieval_query".to_string(), json!(query));
    metadata.insert("retrieved_at".to_string(), json!(retrieved_at));

    RetrievedDocument {
        id: hit.id.unwrap_or_else(|| format!("doc_{}", index)),
        content: hit.content,
        metadata,
        similarity_score: (1.0 - hit.distance).clamp(0.0, 1.0),
        collection: collection.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::retrieval::MockDocumentStore;
    use mockall::predicate::{always, eq};

    fn coordinator(store: MockDocumentStore, collections: &[&str]) -> RetrievalCoordinator {
        RetrievalCoordinator::new(
            Arc::new(store),
            RetrievalConfig {
                collections: collections.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_threshold_sort_and_truncate() {
        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .with(eq("agricultural_knowledge"), always(), eq(3), always())
            .returning(|_, _, _, _| {
                Ok(vec![
                    StoreHit::new("low", 0.8).with_id("d4"),
                    StoreHit::new("mid", 0.2).with_id("d2"),
                ])
            });
        store
            .expect_query()
            .with(eq("crop_diseases"), always(), eq(3), always())
            .returning(|_, _, _, _| {
                Ok(vec![
                    StoreHit::new("best", 0.1).with_id("d1"),
                    StoreHit::new("third", 0.25).with_id("d3"),
                ])
            });

        let coordinator = coordinator(store, &["agricultural_knowledge", "crop_diseases"]);
        let docs = coordinator
            .retrieve(&RetrievalQuery::new("blight").with_top_k(3))
            .await;

        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);

        let scores: Vec<f32> = docs.iter().map(|d| d.similarity_score).collect();
        assert!((scores[0] - 0.9).abs() < 1e-6);
        assert!((scores[1] - 0.8).abs() < 1e-6);
        assert!((scores[2] - 0.75).abs() < 1e-6);
        assert!(docs.iter().all(|d| d.id != "d4"));
    }

    #[tokio::test]
    async fn test_failing_collection_is_skipped() {
        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .with(eq("market_intelligence"), always(), always(), always())
            .returning(|c, _, _, _| Err(DomainError::document_store(c, "connection refused")));
        store
            .expect_query()
            .with(eq("government_schemes"), always(), always(), always())
            .returning(|_, _, _, _| Ok(vec![StoreHit::new("PM-KISAN pays 6000 rupees", 0.3)]));

        let coordinator = coordinator(store, &["market_intelligence", "government_schemes"]);
        let docs = coordinator.retrieve(&RetrievalQuery::new("pm kisan")).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].collection, "government_schemes");
    }

    #[tokio::test]
    async fn test_all_collections_failing_returns_empty() {
        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .returning(|c, _, _, _| Err(DomainError::document_store(c, "down")));

        let coordinator = coordinator(store, &["a", "b"]);
        assert!(coordinator.retrieve(&RetrievalQuery::new("x")).await.is_empty());
    }

    #[tokio::test]
    async fn test_hits_annotated_with_origin() {
        let mut store = MockDocumentStore::new();
        store.expect_query().returning(|_, _, _, _| {
            Ok(vec![
                StoreHit::new("first", 0.0).with_metadata("source", serde_json::json!("ICAR")),
                StoreHit::new("second", 0.1),
            ])
        });

        let coordinator = coordinator(store, &["crop_diseases"]);
        let docs = coordinator.retrieve(&RetrievalQuery::new("rust")).await;

        assert_eq!(docs[0].id, "doc_0");
        assert_eq!(docs[1].id, "doc_1");
        assert_eq!(docs[0].source(), Some("ICAR"));
        assert_eq!(docs[0].metadata["collection"], "crop_diseases");
        assert_eq!(docs[0].metadata["retrieval_query"], "rust");
        assert!(docs[0].metadata.contains_key("retrieved_at"));
    }

    #[tokio::test]
    async fn test_explicit_collections_and_filter_forwarded() {
        let filter = MetadataFilter::new().equals("crop", "wheat");
        let expected = filter.clone();

        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .withf(move |collection, text, top_k, f| {
                collection == "market_intelligence"
                    && text == "wheat price"
                    && *top_k == 5
                    && f.as_ref() == Some(&expected)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));

        let coordinator = coordinator(store, &["agricultural_knowledge"]);
        let docs = coordinator
            .retrieve(
                &RetrievalQuery::new("wheat price")
                    .with_collections(vec!["market_intelligence".to_string()])
                    .with_filter(filter),
            )
            .await;

        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_distance_beyond_one_clamped() {
        let mut store = MockDocumentStore::new();
        store
            .expect_query()
            .returning(|_, _, _, _| Ok(vec![StoreHit::new("far", 1.4)]));

        let coordinator = coordinator(store, &["agricultural_knowledge"]);
        let docs = coordinator
            .retrieve(&RetrievalQuery::new("x").with_similarity_threshold(0.0))
            .await;

        assert_eq!(docs[0].similarity_score, 0.0);
    }
}
