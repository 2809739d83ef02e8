//! Document retrieval across store collections

mod coordinator;
mod document;
mod filter;
mod ingestion;
mod store;

pub use coordinator::{RetrievalConfig, RetrievalCoordinator, RetrievalQuery, DEFAULT_COLLECTIONS};
pub use document::{RetrievedDocument, StoreHit, StoredDocument};
pub use filter::MetadataFilter;
pub use ingestion::{
    ingest_documents, validate_document, IngestionReport, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE,
};
pub use store::DocumentStore;

#[cfg(test)]
pub use store::MockDocumentStore;
