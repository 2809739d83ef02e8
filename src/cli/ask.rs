//! Ask command - grounded answer for one question

use clap::Args;

use crate::domain::grounding::{GroundedAnswer, ResponseType};
use crate::infrastructure::services::AnswerRequest;
use crate::AppContext;

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// The farmer's question
    pub query: String,

    /// Collection to search (repeatable); defaults to every configured collection
    #[arg(long = "collection")]
    pub collections: Vec<String>,

    /// Number of documents to ground the answer on
    #[arg(long)]
    pub top_k: Option<usize>,

    /// comprehensive, concise or technical
    #[arg(long, default_value = "comprehensive")]
    pub response_type: String,

    /// Answer language code
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Metadata filter as key=value (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,
}

pub async fn run(ctx: &AppContext, args: AskArgs) -> anyhow::Result<GroundedAnswer> {
    let mut request = AnswerRequest::new(args.query)
        .with_response_type(ResponseType::from(args.response_type))
        .with_language(args.language);

    if !args.collections.is_empty() {
        request = request.with_collections(args.collections);
    }
    if let Some(top_k) = args.top_k {
        request = request.with_top_k(top_k);
    }
    if let Some(filter) = super::parse_filter(&args.filters)? {
        request = request.with_filter(filter);
    }

    Ok(ctx.knowledge.search_and_generate(&request).await)
}
