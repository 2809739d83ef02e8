//! Search command - ranked documents without generation

use clap::Args;

use crate::domain::retrieval::{RetrievalQuery, RetrievedDocument};
use crate::AppContext;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    pub query: String,

    /// Collection to search (repeatable)
    #[arg(long = "collection")]
    pub collections: Vec<String>,

    #[arg(long)]
    pub top_k: Option<usize>,

    /// Minimum similarity in [0, 1]; defaults to the API threshold
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Metadata filter as key=value (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,
}

pub async fn run(ctx: &AppContext, args: SearchArgs) -> anyhow::Result<Vec<RetrievedDocument>> {
    if let Some(threshold) = args.threshold {
        anyhow::ensure!(
            (0.0..=1.0).contains(&threshold),
            "threshold must be between 0.0 and 1.0"
        );
    }

    let mut query = RetrievalQuery::new(args.query);
    if !args.collections.is_empty() {
        query = query.with_collections(args.collections);
    }
    query.top_k = args.top_k;
    query.similarity_threshold = args.threshold;
    query.filter = super::parse_filter(&args.filters)?;

    Ok(ctx.knowledge.retrieve(query).await)
}
