//! Document store factory

use std::sync::Arc;

use tracing::{info, warn};

use super::in_memory::InMemoryDocumentStore;
use super::json_file::JsonFileDocumentStore;
use crate::config::DocumentStoreConfig;
use crate::domain::retrieval::DocumentStore;
use crate::domain::DomainError;

/// Supported document store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStoreBackend {
    InMemory,
    JsonFile,
}

impl DocumentStoreBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "memory" => Some(Self::InMemory),
            "json_file" | "json" => Some(Self::JsonFile),
            _ => None,
        }
    }
}

/// Factory for creating the configured document store
#[derive(Debug)]
pub struct DocumentStoreFactory;

impl DocumentStoreFactory {
    pub async fn from_config(
        config: &DocumentStoreConfig,
    ) -> Result<Arc<dyn DocumentStore>, DomainError> {
        let backend = DocumentStoreBackend::parse(&config.backend).unwrap_or_else(|| {
            warn!(
                backend = %config.backend,
                "Unknown document store backend, falling back to in-memory"
            );
            DocumentStoreBackend::InMemory
        });

        match backend {
            DocumentStoreBackend::InMemory => {
                info!("Using in-memory document store");
                Ok(Arc::new(InMemoryDocumentStore::new()))
            }
            DocumentStoreBackend::JsonFile => {
                let path = config.seed_path.as_deref().ok_or_else(|| {
                    DomainError::configuration("json_file backend requires document_store.seed_path")
                })?;

                info!(path, "Using JSON file document store");
                Ok(Arc::new(JsonFileDocumentStore::open(path).await?))
            }
        }
    }
}
