//! Grounded answers: context building, prompting and citation validation

mod answer;
mod context;
mod fallback;
mod grounder;
mod prompt;
mod validation;

pub use answer::{GenerationMetadata, GroundedAnswer, ResponseType, SourceDescriptor};
pub use context::{BuiltContext, ContextBuilder, DEFAULT_MAX_CONTEXT_LENGTH};
pub use fallback::{no_documents_answer, template_answer, QueryIntent};
pub use grounder::{GroundingConfig, ResponseGrounder};
pub use prompt::{max_tokens_for, system_instruction, user_prompt};
pub use validation::{validate_grounding, GroundingValidation, WELL_GROUNDED_SCORE};
