//! Infrastructure layer - External service implementations

pub mod document_store;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod services;
