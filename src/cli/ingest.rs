//! Ingest command - index documents from a JSON file

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::domain::retrieval::{IngestionReport, StoredDocument, DEFAULT_BATCH_SIZE};
use crate::AppContext;

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// JSON array of `{ "id"?, "content", "metadata" }` documents
    pub file: PathBuf,

    /// Target collection
    #[arg(long)]
    pub collection: String,

    /// Documents per store call (1-100)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

pub async fn run(ctx: &AppContext, args: IngestArgs) -> anyhow::Result<IngestionReport> {
    let store = ctx.coordinator.store();
    anyhow::ensure!(
        store.is_persistent(),
        "The {} document store discards documents on exit; set document_store.backend = \"json_file\" and document_store.seed_path to ingest",
        store.backend_name()
    );

    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let documents: Vec<StoredDocument> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid document file {}", args.file.display()))?;

    let report = ctx
        .knowledge
        .ingest(documents, &args.collection, args.batch_size)
        .await?;

    Ok(report)
}
