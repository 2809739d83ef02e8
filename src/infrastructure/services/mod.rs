//! Infrastructure services

mod knowledge_service;

pub use knowledge_service::{AnswerRequest, KnowledgeBaseStats, KnowledgeService, ServiceHealth};
