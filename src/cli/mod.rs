//! CLI module for the agricultural knowledge core
//!
//! Every subcommand builds the application context, runs one operation and
//! prints the result as JSON on stdout.

pub mod ask;
pub mod generate;
pub mod ingest;
pub mod search;
pub mod status;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::MetadataFilter;
use crate::infrastructure::logging;
use crate::AppContext;

/// Agricultural knowledge assistant - grounded answers from curated documents
#[derive(Parser, Debug)]
#[command(name = "agri-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question from the knowledge base
    Ask(ask::AskArgs),

    /// Retrieve matching documents without generating an answer
    Search(search::SearchArgs),

    /// Send a raw prompt through the LLM gateway
    Generate(generate::GenerateArgs),

    /// Probe every provider and the document store
    Health,

    /// Knowledge base counts and gateway metrics
    Stats(status::StatsArgs),

    /// Validate and index documents from a JSON file
    Ingest(ingest::IngestArgs),
}

/// Load configuration, initialize logging and run the selected command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Logging already initialized: {}", e);
    }

    let ctx = AppContext::from_config(config).await?;
    let result = execute(&ctx, cli.command).await;
    ctx.shutdown().await;

    println!("{}", result?);
    Ok(())
}

/// Run one command and render its output
pub async fn execute(ctx: &AppContext, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Ask(args) => to_json(&ask::run(ctx, args).await?),
        Command::Search(args) => to_json(&search::run(ctx, args).await?),
        Command::Generate(args) => to_json(&generate::run(ctx, args).await?),
        Command::Health => to_json(&ctx.knowledge.health().await),
        Command::Stats(args) if args.prometheus => status::prometheus(ctx),
        Command::Stats(_) => to_json(&status::stats(ctx).await),
        Command::Ingest(args) => to_json(&ingest::run(ctx, args).await?),
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Parse repeated `--filter key=value` arguments
pub(crate) fn parse_filter(pairs: &[String]) -> anyhow::Result<Option<MetadataFilter>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let filter = MetadataFilter::parse_pairs(pairs.iter().map(String::as_str))?;
    Ok(Some(filter))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::config::{DocumentStoreConfig, MetricsConfig, ProviderSettings, ProvidersConfig};
    use crate::domain::retrieval::StoredDocument;
    use crate::{AppConfig, AppContext};
    use serde_json::json;

    /// No providers, metrics off, in-memory store
    pub fn offline_config() -> AppConfig {
        let disabled = ProviderSettings {
            api_key: Some(String::new()),
            ..Default::default()
        };

        AppConfig {
            providers: ProvidersConfig {
                openai: disabled.clone(),
                anthropic: disabled,
            },
            metrics: MetricsConfig { enabled: false },
            ..Default::default()
        }
    }

    /// `offline_config` backed by a JSON file store at `path`
    pub fn persistent_config(path: &Path) -> AppConfig {
        AppConfig {
            document_store: DocumentStoreConfig {
                backend: "json_file".to_string(),
                seed_path: Some(path.to_string_lossy().into_owned()),
            },
            ..offline_config()
        }
    }

    /// Context with no providers and a small seeded in-memory store
    pub async fn offline_context() -> AppContext {
        let ctx = AppContext::from_config(offline_config()).await.unwrap();
        ctx.knowledge
            .ingest(
                vec![
                    StoredDocument::new("Yellow rust of wheat appears as stripes of yellow pustules")
                        .with_id("rust")
                        .with_metadata("source", json!("ICAR"))
                        .with_metadata("crop", json!("wheat"))
                        .with_metadata("category", json!("disease_management")),
                    StoredDocument::new("Aphids on mustard can be controlled with neem oil spray")
                        .with_id("aphid")
                        .with_metadata("source", json!("KVK"))
                        .with_metadata("crop", json!("mustard")),
                ],
                "crop_diseases",
                10,
            )
            .await
            .unwrap();

        ctx
    }
}
