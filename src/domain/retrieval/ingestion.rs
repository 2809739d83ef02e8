//! Batch ingestion of documents into a store collection

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{DocumentStore, StoredDocument};
use crate::domain::error::DomainError;

pub const MIN_CONTENT_LENGTH: usize = 10;
pub const MAX_CONTENT_LENGTH: usize = 10_000;
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const MAX_BATCH_SIZE: usize = 100;

/// Outcome of an ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub ingested_ids: Vec<String>,
    pub collection: String,
    pub ingested_at: DateTime<Utc>,
}

/// Check that a document is fit for indexing
pub fn validate_document(document: &StoredDocument) -> Result<(), DomainError> {
    let trimmed = document.content.trim();

    if trimmed.chars().count() < MIN_CONTENT_LENGTH {
        return Err(DomainError::validation(format!(
            "Document content must be at least {} characters",
            MIN_CONTENT_LENGTH
        )));
    }

    if document.content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(DomainError::validation(format!(
            "Document content must be at most {} characters",
            MAX_CONTENT_LENGTH
        )));
    }

    let has_source = match document.metadata.get("source") {
        Some(serde_json::Value::String(source)) => !source.trim().is_empty(),
        Some(serde_json::Value::Null) | None => false,
        Some(_) => true,
    };

    if !has_source {
        return Err(DomainError::validation("Document metadata requires a 'source'"));
    }

    Ok(())
}

/// Validate and index `documents` in batches of `batch_size`.
///
/// Invalid documents count as failed. A store error fails every valid
/// document of that batch; later batches still run.
pub async fn ingest_documents(
    store: &dyn DocumentStore,
    documents: Vec<StoredDocument>,
    collection: &str,
    batch_size: usize,
) -> Result<IngestionReport, DomainError> {
    if !(1..=MAX_BATCH_SIZE).contains(&batch_size) {
        return Err(DomainError::validation(format!(
            "batch_size must be between 1 and {}",
            MAX_BATCH_SIZE
        )));
    }

    let total = documents.len();
    let mut processed = 0;
    let mut failed = 0;
    let mut ingested_ids = Vec::new();

    let mut documents = documents.into_iter().peekable();
    let mut batch_number = 0;

    while documents.peek().is_some() {
        batch_number += 1;
        let mut batch = Vec::with_capacity(batch_size);

        for mut document in documents.by_ref().take(batch_size) {
            match validate_document(&document) {
                Ok(()) => {
                    if document.id.is_none() {
                        document.id = Some(Uuid::new_v4().to_string());
                    }
                    batch.push(document);
                }
                Err(err) => {
                    warn!(collection, error = %err, "Skipping invalid document");
                    failed += 1;
                }
            }
        }

        if batch.is_empty() {
            continue;
        }

        let batch_len = batch.len();
        match store.add_documents(collection, batch).await {
            Ok(ids) => {
                processed += batch_len;
                ingested_ids.extend(ids);
            }
            Err(err) => {
                error!(collection, batch = batch_number, error = %err, "Failed to ingest batch");
                failed += batch_len;
            }
        }
    }

    info!(collection, processed, total, "Ingested documents");

    Ok(IngestionReport {
        total,
        processed,
        failed,
        success_rate: processed as f64 / total.max(1) as f64,
        ingested_ids,
        collection: collection.to_string(),
        ingested_at: Utc::now(),
    })
}
