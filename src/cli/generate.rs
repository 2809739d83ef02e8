//! Generate command - raw prompt through the gateway

use clap::Args;

use crate::domain::llm::{GenerationRequest, GenerationResult};
use crate::AppContext;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    pub prompt: String,

    /// System message
    #[arg(long)]
    pub system: Option<String>,

    /// Try this provider first
    #[arg(long)]
    pub provider: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub temperature: Option<f32>,
}

impl GenerateArgs {
    fn to_request(&self) -> anyhow::Result<GenerationRequest> {
        let mut builder = GenerationRequest::builder(self.prompt.clone());

        if let Some(system) = &self.system {
            builder = builder.system(system.clone());
        }
        if let Some(model) = &self.model {
            builder = builder.model(model.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }

        Ok(builder.build()?)
    }
}

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> anyhow::Result<GenerationResult> {
    let request = args.to_request()?;
    let result = ctx
        .knowledge
        .generate(&request, args.provider.as_deref())
        .await?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::offline_context;
    use crate::domain::llm::LlmError;

    fn args(temperature: Option<f32>) -> GenerateArgs {
        GenerateArgs {
            prompt: "When to sow mustard?".to_string(),
            system: Some("Be brief.".to_string()),
            provider: None,
            model: Some("gpt-4".to_string()),
            max_tokens: Some(50),
            temperature,
        }
    }

    #[test]
    fn test_request_from_args() {
        let request = args(Some(0.2)).to_request().unwrap();

        assert_eq!(request.prompt(), "When to sow mustard?");
        assert_eq!(request.system_message(), Some("Be brief."));
        assert_eq!(request.model(), Some("gpt-4"));
        assert_eq!(request.max_tokens(), Some(50));
        assert_eq!(request.temperature(), Some(0.2));
    }

    #[test]
    fn test_out_of_range_temperature_rejected() {
        assert!(args(Some(1.5)).to_request().is_err());
    }

    #[tokio::test]
    async fn test_generate_without_providers_is_exhausted() {
        let ctx = offline_context().await;

        let err = run(&ctx, args(None)).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LlmError>(),
            Some(LlmError::AllProvidersExhausted { .. })
        ));
        assert_eq!(ctx.gateway.metrics().await.metrics.failed_requests, 1);
    }
}
