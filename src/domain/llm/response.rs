use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw output of a single provider completion call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub model_used: String,
    pub tokens_used: u32,
}

impl Completion {
    pub fn new(text: impl Into<String>, model_used: impl Into<String>, tokens_used: u32) -> Self {
        Self {
            text: text.into(),
            model_used: model_used.into(),
            tokens_used,
        }
    }
}

/// Successful gateway generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u32,
    #[serde(with = "duration_secs")]
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GenerationResult {
    pub fn from_completion(
        completion: Completion,
        provider: impl Into<String>,
        latency: Duration,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            content: completion.text,
            provider: provider.into(),
            model: completion.model_used,
            tokens_used: completion.tokens_used,
            latency,
            timestamp: Utc::now(),
            metadata,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_from_completion() {
        let mut metadata = HashMap::new();
        metadata.insert("query".to_string(), serde_json::json!("wheat rust"));

        let result = GenerationResult::from_completion(
            Completion::new("Apply fungicide [Source 1]", "gpt-4", 42),
            "openai",
            Duration::from_millis(1500),
            metadata,
        );

        assert_eq!(result.content, "Apply fungicide [Source 1]");
        assert_eq!(result.provider, "openai");
        assert_eq!(result.model, "gpt-4");
        assert_eq!(result.tokens_used, 42);
        assert_eq!(result.metadata.get("query"), Some(&serde_json::json!("wheat rust")));
    }

    #[test]
    fn test_latency_serialized_as_seconds() {
        let result = GenerationResult::from_completion(
            Completion::new("ok", "m", 1),
            "openai",
            Duration::from_millis(250),
            HashMap::new(),
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["latency"], serde_json::json!(0.25));
    }
}
