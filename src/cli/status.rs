//! Health and stats commands

use clap::Args;
use serde::Serialize;

use crate::domain::gateway::MetricsSnapshot;
use crate::infrastructure::services::KnowledgeBaseStats;
use crate::AppContext;

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Print the Prometheus exposition text instead of JSON
    #[arg(long)]
    pub prometheus: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub knowledge_base: KnowledgeBaseStats,
    pub gateway: MetricsSnapshot,
}

pub async fn stats(ctx: &AppContext) -> StatsReport {
    StatsReport {
        knowledge_base: ctx.knowledge.knowledge_base_stats().await,
        gateway: ctx.knowledge.metrics().await,
    }
}

pub fn prometheus(ctx: &AppContext) -> anyhow::Result<String> {
    let metrics = ctx
        .metrics
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Prometheus metrics are disabled"))?;

    Ok(metrics.render())
}
