//! Retrieval-grounded answer generation

use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, histogram};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use super::context::{ContextBuilder, DEFAULT_MAX_CONTEXT_LENGTH};
use super::fallback::{no_documents_answer, template_answer};
use super::prompt::{max_tokens_for, system_instruction, user_prompt};
use super::validation::validate_grounding;
use super::{GenerationMetadata, GroundedAnswer, ResponseType, SourceDescriptor};
use crate::domain::error::DomainError;
use crate::domain::gateway::LlmGateway;
use crate::domain::llm::{GenerationRequest, GenerationResult, LlmError};
use crate::domain::retrieval::RetrievedDocument;

/// Why grounded generation produced no text
#[derive(Debug, Error)]
enum GenerationFailure {
    #[error("invalid generation request: {0}")]
    Request(#[from] DomainError),
    #[error(transparent)]
    Gateway(#[from] LlmError),
}

#[derive(Debug, Clone, Copy)]
pub struct GroundingConfig {
    pub max_context_length_chars: usize,
    /// Sampling temperature for grounded generation
    pub temperature: f32,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            max_context_length_chars: DEFAULT_MAX_CONTEXT_LENGTH,
            temperature: 0.3,
        }
    }
}

/// Builds context from retrieved documents, generates through the gateway
/// and validates the answer against the documents
#[derive(Debug)]
pub struct ResponseGrounder {
    gateway: Arc<LlmGateway>,
    context_builder: ContextBuilder,
    config: GroundingConfig,
}

impl ResponseGrounder {
    pub fn new(gateway: Arc<LlmGateway>, config: GroundingConfig) -> Self {
        Self {
            gateway,
            context_builder: ContextBuilder::new(config.max_context_length_chars),
            config,
        }
    }

    pub fn gateway(&self) -> &Arc<LlmGateway> {
        &self.gateway
    }

    /// Answer `query` from `documents`. Never fails: no documents yields a
    /// static answer, a generation failure yields a snippet template answer.
    pub async fn answer(
        &self,
        query: &str,
        documents: &[RetrievedDocument],
        response_type: ResponseType,
        language: &str,
    ) -> GroundedAnswer {
        if documents.is_empty() {
            counter!("rag_answers_total", "outcome" => "no_documents").increment(1);
            return no_documents(query, language);
        }

        let context = self.context_builder.build(documents);
        let sources: Vec<SourceDescriptor> = documents.iter().map(SourceDescriptor::from).collect();

        let (answer, context_used, generation) = match self
            .generate(query, &context.text, documents.len(), &response_type, language)
            .await
        {
            Ok(result) => {
                let metadata = GenerationMetadata::from(&result);
                (result.content, context.text, Some(metadata))
            }
            Err(err) => {
                error!(error = %err, "Grounded generation failed, using template answer");
                (template_answer(query, documents), String::new(), None)
            }
        };

        let fallback_used = generation.is_none();
        let validation = validate_grounding(&answer, documents);

        let outcome = if fallback_used { "template" } else { "generated" };
        counter!("rag_answers_total", "outcome" => outcome).increment(1);
        histogram!("rag_grounding_score").record(validation.grounding_score);

        info!(
            query = %truncate(query, 50),
            sources = documents.len(),
            grounding_score = validation.grounding_score,
            hallucination_risk = validation.hallucination_risk,
            fallback_used,
            "Generated grounded answer"
        );

        GroundedAnswer {
            answer,
            num_sources: sources.len(),
            sources,
            grounding_score: validation.grounding_score,
            hallucination_risk: validation.hallucination_risk,
            hallucination_indicators: validation.hallucination_indicators,
            well_grounded: validation.well_grounded,
            language: language.to_string(),
            generation,
            query: query.to_string(),
            response_type,
            context_used,
            generated_at: Utc::now(),
            referenced_sources: validation.referenced_sources,
            source_references: validation.source_references,
            fallback_used,
        }
    }

    async fn generate(
        &self,
        query: &str,
        context: &str,
        num_sources: usize,
        response_type: &ResponseType,
        language: &str,
    ) -> Result<GenerationResult, GenerationFailure> {
        let request = GenerationRequest::builder(user_prompt(query, context, language))
            .system(system_instruction(response_type, language))
            .max_tokens(max_tokens_for(response_type))
            .temperature(self.config.temperature)
            .metadata("query", json!(query))
            .metadata("response_type", json!(response_type.as_str()))
            .metadata("language", json!(language))
            .metadata("num_sources", json!(num_sources))
            .build()?;

        Ok(self.gateway.generate(&request, None).await?)
    }
}

fn no_documents(query: &str, language: &str) -> GroundedAnswer {
    GroundedAnswer {
        answer: no_documents_answer(language).to_string(),
        sources: Vec::new(),
        grounding_score: 0.0,
        hallucination_risk: false,
        hallucination_indicators: Vec::new(),
        well_grounded: false,
        language: language.to_string(),
        generation: None,
        query: query.to_string(),
        response_type: ResponseType::Fallback,
        context_used: String::new(),
        generated_at: Utc::now(),
        num_sources: 0,
        referenced_sources: 0,
        source_references: Vec::new(),
        fallback_used: false,
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateway::{GatewayConfig, RetryPolicy};
    use crate::domain::llm::{Completion, MockProviderClient, ProviderClient};

    fn gateway_with(client: MockProviderClient) -> (Arc<LlmGateway>, Arc<MockProviderClient>) {
        let client = Arc::new(client);
        let gateway = LlmGateway::new(GatewayConfig {
            primary_provider: client.provider_id().to_string(),
            fallback_provider: client.provider_id().to_string(),
            retry: RetryPolicy::new(0),
            ..Default::default()
        })
        .with_provider(client.clone());

        (Arc::new(gateway), client)
    }

    fn documents() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument::new("d1", "Late blight thrives in cool humid weather.", 0.92, "crop_diseases")
                .with_metadata("source", serde_json::json!("ICAR"))
                .with_metadata("category", serde_json::json!("disease_management")),
            RetrievedDocument::new("d2", "Remove infected leaves and destroy them.", 0.85, "crop_diseases"),
            RetrievedDocument::new("d3", "Spray Mancozeb 75% WP at 2.5 kg per hectare.", 0.8, "crop_diseases"),
            RetrievedDocument::new("d4", "Use certified disease-free seed tubers.", 0.7, "agricultural_knowledge"),
        ]
    }

    #[tokio::test]
    async fn test_generated_answer_is_validated() {
        let (gateway, client) = gateway_with(MockProviderClient::succeeding(
            "openai",
            "Blight spreads in humid weather [Source 1]. Remove leaves [Source 2].",
        ));
        let grounder = ResponseGrounder::new(gateway, GroundingConfig::default());

        let answer = grounder
            .answer("How to manage potato blight?", &documents(), ResponseType::Concise, "en")
            .await;

        assert_eq!(answer.grounding_score, 0.5);
        assert_eq!(answer.referenced_sources, 2);
        assert_eq!(answer.num_sources, 4);
        assert!(!answer.well_grounded);
        assert!(!answer.hallucination_risk);
        assert!(!answer.fallback_used);
        assert_eq!(answer.sources[0].source, "ICAR");
        assert_eq!(answer.sources[1].source, "Unknown");
        assert_eq!(answer.generation.as_ref().unwrap().provider, "openai");
        assert!(answer.context_used.starts_with("[Source 1] Source: ICAR, Category: disease_management\n"));

        let sent = client.last_request().unwrap();
        assert_eq!(sent.max_tokens, 300);
        assert_eq!(sent.temperature, 0.3);
        assert!(sent.prompt.contains("FARMER'S QUESTION: How to manage potato blight?"));
        assert!(sent.system_message.unwrap().contains("Response Style: Provide concise"));
    }

    #[tokio::test]
    async fn test_unsupported_amount_flags_risk() {
        let (gateway, _) = gateway_with(MockProviderClient::succeeding(
            "openai",
            "The treatment costs 500 rupees [Source 1] [Source 2] [Source 3].",
        ));
        let grounder = ResponseGrounder::new(gateway, GroundingConfig::default());

        let answer = grounder
            .answer("blight cost", &documents(), ResponseType::Comprehensive, "en")
            .await;

        assert_eq!(answer.grounding_score, 0.75);
        assert!(answer.hallucination_risk);
        assert_eq!(
            answer.hallucination_indicators,
            vec!["Unsupported numeric claim: 500 rupees"]
        );
        assert!(!answer.well_grounded);
    }

    #[tokio::test]
    async fn test_gateway_failure_uses_template_answer() {
        let (gateway, _) = gateway_with(MockProviderClient::failing(
            "openai",
            LlmError::provider("openai", "invalid api key"),
        ));
        let grounder = ResponseGrounder::new(gateway, GroundingConfig::default());

        let answer = grounder
            .answer("what disease is this", &documents(), ResponseType::Technical, "en")
            .await;

        assert!(answer.fallback_used);
        assert!(answer.generation.is_none());
        assert!(answer.context_used.is_empty());
        assert!(answer.answer.starts_with("According to ICAR [Source 1], Late blight"));
        assert_eq!(answer.response_type, ResponseType::Technical);
        // d1 by category, d4 mentions disease
        assert_eq!(answer.referenced_sources, 2);
        assert_eq!(answer.sources.len(), 4);
    }

    #[tokio::test]
    async fn test_no_documents_returns_static_answer_without_generation() {
        let (gateway, client) = gateway_with(MockProviderClient::new("openai"));
        let grounder = ResponseGrounder::new(gateway, GroundingConfig::default());

        let first = grounder.answer("anything", &[], ResponseType::Concise, "hi").await;
        let second = grounder.answer("anything", &[], ResponseType::Technical, "hi").await;

        assert_eq!(first.answer, second.answer);
        assert_eq!(first.answer, no_documents_answer("hi"));
        assert_eq!(first.grounding_score, 0.0);
        assert!(!first.well_grounded);
        assert!(!first.hallucination_risk);
        assert!(first.sources.is_empty());
        assert_eq!(first.response_type, ResponseType::Fallback);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_context_respects_configured_limit() {
        let (gateway, client) = gateway_with(
            MockProviderClient::new("openai")
                .always(Ok(Completion::new("See [Source 1].", "gpt", 5))),
        );
        let grounder = ResponseGrounder::new(
            gateway,
            GroundingConfig {
                max_context_length_chars: 120,
                ..Default::default()
            },
        );

        let answer = grounder
            .answer("blight", &documents(), ResponseType::Concise, "en")
            .await;

        assert!(answer.context_used.chars().count() <= 120);
        assert!(answer.context_used.contains("[Source 1]"));
        assert!(!answer.context_used.contains("[Source 3]"));
        // all supplied documents still count as sources
        assert_eq!(answer.sources.len(), 4);
        assert!(client.last_request().unwrap().prompt.contains(&answer.context_used));
    }

    #[tokio::test]
    async fn test_invalid_temperature_degrades_to_template() {
        let (gateway, client) = gateway_with(MockProviderClient::new("openai"));
        let grounder = ResponseGrounder::new(
            gateway,
            GroundingConfig {
                temperature: 1.5,
                ..Default::default()
            },
        );

        let answer = grounder
            .answer("wheat", &documents(), ResponseType::Concise, "en")
            .await;

        assert!(answer.fallback_used);
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate("गेहूं", 2), "गे");
        assert_eq!(truncate("rice", 10), "rice");
    }
}
