//! Grounded answer types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::llm::GenerationResult;
use crate::domain::retrieval::RetrievedDocument;

/// Requested answer style; unknown styles are carried through verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseType {
    Comprehensive,
    Concise,
    Technical,
    /// Static answer given when nothing was retrieved
    Fallback,
    Other(String),
}

impl Default for ResponseType {
    fn default() -> Self {
        Self::Comprehensive
    }
}

impl ResponseType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Comprehensive => "comprehensive",
            Self::Concise => "concise",
            Self::Technical => "technical",
            Self::Fallback => "fallback",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ResponseType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "comprehensive" => Self::Comprehensive,
            "concise" => Self::Concise,
            "technical" => Self::Technical,
            "fallback" => Self::Fallback,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ResponseType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ResponseType> for String {
    fn from(value: ResponseType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of one document supplied to the grounder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    pub source: String,
    pub category: String,
    pub collection: String,
    pub similarity_score: f32,
}

impl From<&RetrievedDocument> for SourceDescriptor {
    fn from(doc: &RetrievedDocument) -> Self {
        Self {
            id: doc.id.clone(),
            source: doc.source().unwrap_or("Unknown").to_string(),
            category: doc.category().unwrap_or("General").to_string(),
            collection: doc
                .metadata_str("collection")
                .unwrap_or(if doc.collection.is_empty() {
                    "Unknown"
                } else {
                    doc.collection.as_str()
                })
                .to_string(),
            similarity_score: doc.similarity_score,
        }
    }
}

/// Which model produced the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub provider: String,
    pub model: String,
    pub tokens_used: u32,
    /// Seconds
    pub response_time: f64,
}

impl From<&GenerationResult> for GenerationMetadata {
    fn from(result: &GenerationResult) -> Self {
        Self {
            provider: result.provider.clone(),
            model: result.model.clone(),
            tokens_used: result.tokens_used,
            response_time: result.latency.as_secs_f64(),
        }
    }
}

/// Answer plus grounding diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub answer: String,
    /// Exactly the documents handed to the grounder, in order
    pub sources: Vec<SourceDescriptor>,
    pub grounding_score: f64,
    pub hallucination_risk: bool,
    pub hallucination_indicators: Vec<String>,
    pub well_grounded: bool,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenerationMetadata>,
    pub query: String,
    pub response_type: ResponseType,
    pub context_used: String,
    pub generated_at: DateTime<Utc>,
    pub num_sources: usize,
    pub referenced_sources: usize,
    /// Raw `[Source N]` markers in order of appearance
    pub source_references: Vec<String>,
    /// Set when generation failed and the answer was assembled from snippets
    pub fallback_used: bool,
}
