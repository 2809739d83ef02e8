//! Domain layer - Core logic and contracts

pub mod error;
pub mod gateway;
pub mod grounding;
pub mod llm;
pub mod retrieval;

pub use error::DomainError;
pub use gateway::{
    CircuitSnapshot, CircuitState, GatewayConfig, HealthReport, HealthStatus, LlmGateway,
    MetricsSnapshot, RetryPolicy,
};
pub use grounding::{GroundedAnswer, GroundingConfig, ResponseGrounder, ResponseType};
pub use llm::{
    Completion, CompletionRequest, GenerationRequest, GenerationResult, LlmError, ProviderClient,
};
pub use retrieval::{
    DocumentStore, IngestionReport, MetadataFilter, RetrievalConfig, RetrievalCoordinator,
    RetrievalQuery, RetrievedDocument, StoredDocument,
};
