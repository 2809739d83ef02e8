//! Document store persisted to a JSON file
//!
//! The file is loaded into an in-memory store on open and rewritten after
//! every `add_documents`, so ingested documents survive restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::in_memory::InMemoryDocumentStore;
use crate::domain::retrieval::{
    validate_document, DocumentStore, MetadataFilter, StoreHit, StoredDocument,
};
use crate::domain::DomainError;

/// `{ "collection": [ { "id"?, "content", "metadata" }, ... ] }`
pub type SeedFile = BTreeMap<String, Vec<StoredDocument>>;

/// Read and parse a seed file
pub async fn read_seed_file(path: impl AsRef<Path>) -> Result<SeedFile, DomainError> {
    let path = path.as_ref();

    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::configuration(format!("Failed to read seed file {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        DomainError::configuration(format!("Invalid seed file {}: {}", path.display(), e))
    })
}

/// Drop documents that ingestion would reject
fn valid_documents(collection: &str, documents: Vec<StoredDocument>) -> Vec<StoredDocument> {
    documents
        .into_iter()
        .enumerate()
        .filter_map(|(i, doc)| match validate_document(&doc) {
            Ok(()) => Some(doc),
            Err(err) => {
                warn!(collection, index = i, error = %err, "Skipping invalid seed document");
                None
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct JsonFileDocumentStore {
    path: PathBuf,
    inner: InMemoryDocumentStore,
    /// Serializes add-then-write so the file never lags a concurrent add
    write_lock: Mutex<()>,
}

impl JsonFileDocumentStore {
    /// Open the store at `path`; a missing file starts empty and is created
    /// on the first write
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let inner = InMemoryDocumentStore::new();

        let exists = tokio::fs::try_exists(&path).await.map_err(|e| {
            DomainError::configuration(format!("Cannot access {}: {}", path.display(), e))
        })?;

        if exists {
            let mut total = 0;
            for (collection, documents) in read_seed_file(&path).await? {
                let documents = valid_documents(&collection, documents);
                total += inner.add_documents(&collection, documents).await?.len();
            }
            info!(path = %path.display(), documents = total, "Loaded document store file");
        } else {
            info!(path = %path.display(), "Document store file not found, starting empty");
        }

        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full contents to a sibling temp file, then rename over the target
    async fn persist(&self, collection: &str) -> Result<(), DomainError> {
        let io_error = |action: &str, e: std::io::Error| {
            DomainError::document_store(
                collection,
                format!("Failed to {} {}: {}", action, self.path.display(), e),
            )
        };

        let snapshot = self.inner.snapshot().await;
        let body = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| DomainError::document_store(collection, e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| io_error("write", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error("replace", e))?;

        debug!(path = %self.path.display(), "Document store file written");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileDocumentStore {
    fn backend_name(&self) -> &'static str {
        "json_file"
    }

    fn is_persistent(&self) -> bool {
        true
    }

    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        top_k: usize,
        filter: Option<MetadataFilter>,
    ) -> Result<Vec<StoreHit>, DomainError> {
        self.inner.query(collection, query_text, top_k, filter).await
    }

    async fn add_documents(
        &self,
        collection: &str,
        documents: Vec<StoredDocument>,
    ) -> Result<Vec<String>, DomainError> {
        let _guard = self.write_lock.lock().await;

        let ids = self.inner.add_documents(collection, documents).await?;
        self.persist(collection).await?;

        Ok(ids)
    }

    async fn count(&self, collection: &str) -> Result<usize, DomainError> {
        self.inner.count(collection).await
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        self.inner.health_check().await
    }
}
