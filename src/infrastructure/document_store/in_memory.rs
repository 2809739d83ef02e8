//! In-memory document store for development and testing

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::retrieval::{DocumentStore, MetadataFilter, StoreHit, StoredDocument};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    content: String,
    terms: HashSet<String>,
    metadata: HashMap<String, serde_json::Value>,
}

/// Term-overlap search over documents held in memory.
///
/// Distance is `1 - |query terms ∩ document terms| / |query terms|`, so hits
/// are deterministic and need no embedding model.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Entry>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every document, grouped by collection, in insertion order
    pub async fn snapshot(&self) -> BTreeMap<String, Vec<StoredDocument>> {
        self.collections
            .read()
            .await
            .iter()
            .map(|(collection, entries)| {
                let documents = entries
                    .iter()
                    .map(|entry| StoredDocument {
                        id: Some(entry.id.clone()),
                        content: entry.content.clone(),
                        metadata: entry.metadata.clone(),
                    })
                    .collect();
                (collection.clone(), documents)
            })
            .collect()
    }

    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn distance(query_terms: &HashSet<String>, doc_terms: &HashSet<String>) -> f32 {
    if query_terms.is_empty() {
        return 1.0;
    }

    let shared = query_terms.intersection(doc_terms).count();
    1.0 - shared as f32 / query_terms.len() as f32
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        top_k: usize,
        filter: Option<MetadataFilter>,
    ) -> Result<Vec<StoreHit>, DomainError> {
        let collections = self.collections.read().await;
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let query_terms = terms(query_text);

        let mut hits: Vec<StoreHit> = entries
            .iter()
            .filter(|entry| filter.as_ref().is_none_or(|f| f.matches(&entry.metadata)))
            .map(|entry| StoreHit {
                id: Some(entry.id.clone()),
                content: entry.content.clone(),
                metadata: entry.metadata.clone(),
                distance: distance(&query_terms, &entry.terms),
            })
            .collect();

        // stable: ties keep insertion order
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);

        Ok(hits)
    }

    async fn add_documents(
        &self,
        collection: &str,
        documents: Vec<StoredDocument>,
    ) -> Result<Vec<String>, DomainError> {
        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection.to_string()).or_default();

        let ids = documents
            .into_iter()
            .map(|doc| {
                let id = doc.id.unwrap_or_else(|| Uuid::new_v4().to_string());

                let entry = Entry {
                    id: id.clone(),
                    terms: terms(&doc.content),
                    content: doc.content,
                    metadata: doc.metadata,
                };

                match entries.iter_mut().find(|e| e.id == id) {
                    Some(existing) => *existing = entry,
                    None => entries.push(entry),
                }

                id
            })
            .collect();

        Ok(ids)
    }

    async fn count(&self, collection: &str) -> Result<usize, DomainError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len))
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}
