//! Document types exchanged with the document store

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Document handed to the store for indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StoredDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Raw hit returned by a store query
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    pub id: Option<String>,
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
    /// Distance from the query; 0.0 is an exact match
    pub distance: f32,
}

impl StoreHit {
    pub fn new(content: impl Into<String>, distance: f32) -> Self {
        Self {
            id: None,
            content: content.into(),
            metadata: HashMap::new(),
            distance,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A ranked document produced by a retrieval call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, serde_json::Value>,
    /// Similarity in [0, 1], higher is more relevant
    pub similarity_score: f32,
    pub collection: String,
}

impl RetrievedDocument {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        similarity_score: f32,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
            similarity_score,
            collection: collection.into(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// String metadata value, ignoring empty strings
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata_str("source")
    }

    pub fn category(&self) -> Option<&str> {
        self.metadata_str("category")
    }

    pub fn crop(&self) -> Option<&str> {
        self.metadata_str("crop")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_accessors() {
        let doc = RetrievedDocument::new("d1", "Apply neem oil", 0.8, "crop_diseases")
            .with_metadata("source", json!("ICAR"))
            .with_metadata("crop", json!(""))
            .with_metadata("year", json!(2023));

        assert_eq!(doc.source(), Some("ICAR"));
        assert_eq!(doc.crop(), None);
        assert_eq!(doc.category(), None);
        assert_eq!(doc.metadata_str("year"), None);
    }

    #[test]
    fn test_stored_document_deserializes_without_id() {
        let doc: StoredDocument = serde_json::from_value(json!({
            "content": "Wheat sowing window is November",
            "metadata": {"source": "KVK"}
        }))
        .unwrap();

        assert_eq!(doc.id, None);
        assert_eq!(doc.metadata["source"], json!("KVK"));
    }
}
