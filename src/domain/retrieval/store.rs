//! Document store capability

use async_trait::async_trait;

use super::{MetadataFilter, StoreHit, StoredDocument};
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Pluggable document search backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Backend name for logs and stats
    fn backend_name(&self) -> &'static str;

    /// Whether added documents outlive the process
    fn is_persistent(&self) -> bool {
        false
    }

    /// Nearest `top_k` hits for `query_text` within one collection
    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        top_k: usize,
        filter: Option<MetadataFilter>,
    ) -> Result<Vec<StoreHit>, DomainError>;

    /// Index documents, returning their ids in input order
    async fn add_documents(
        &self,
        collection: &str,
        documents: Vec<StoredDocument>,
    ) -> Result<Vec<String>, DomainError>;

    /// Number of documents held in a collection
    async fn count(&self, collection: &str) -> Result<usize, DomainError>;

    async fn health_check(&self) -> Result<bool, DomainError>;
}
