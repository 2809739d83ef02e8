use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Document store error: {collection} - {message}")]
    DocumentStore { collection: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn document_store(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentStore {
            collection: collection.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Collection 'crop_diseases' not found");
        assert_eq!(
            error.to_string(),
            "Not found: Collection 'crop_diseases' not found"
        );
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("temperature must be within 0.0..=1.0");
        assert_eq!(
            error.to_string(),
            "Validation error: temperature must be within 0.0..=1.0"
        );
    }

    #[test]
    fn test_document_store_error() {
        let error = DomainError::document_store("market_intelligence", "connection refused");
        assert_eq!(
            error.to_string(),
            "Document store error: market_intelligence - connection refused"
        );
    }
}
