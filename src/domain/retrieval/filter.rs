//! Metadata equality filter forwarded to document stores

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Conjunction of `key == value` conditions on document metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter {
    conditions: BTreeMap<String, serde_json::Value>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition
    pub fn equals(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.conditions.iter()
    }

    /// True when every condition holds; an empty filter matches everything
    pub fn matches(&self, metadata: &HashMap<String, serde_json::Value>) -> bool {
        self.conditions
            .iter()
            .all(|(key, expected)| metadata.get(key) == Some(expected))
    }

    /// Parse `key=value` pairs, e.g. from the command line
    pub fn parse_pairs<'a>(
        pairs: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, DomainError> {
        let mut filter = Self::new();

        for pair in pairs {
            let Some((key, value)) = pair.split_once('=') else {
                return Err(DomainError::validation(format!(
                    "Invalid filter '{}', expected key=value",
                    pair
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(DomainError::validation(
                    "Filter key must not be empty",
                ));
            }

            filter = filter.equals(key, value.trim());
        }

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> HashMap<String, serde_json::Value> {
        HashMap::from([
            ("crop".to_string(), json!("rice")),
            ("state".to_string(), json!("Punjab")),
        ])
    }

    #[test]
    fn test_empty_filter_matches() {
        assert!(MetadataFilter::new().matches(&metadata()));
    }

    #[test]
    fn test_all_conditions_required() {
        let filter = MetadataFilter::new().equals("crop", "rice").equals("state", "Punjab");
        assert!(filter.matches(&metadata()));

        let filter = MetadataFilter::new().equals("crop", "rice").equals("state", "Bihar");
        assert!(!filter.matches(&metadata()));

        let filter = MetadataFilter::new().equals("season", "kharif");
        assert!(!filter.matches(&metadata()));
    }

    #[test]
    fn test_parse_pairs() {
        let filter = MetadataFilter::parse_pairs(["crop = rice", "state=Punjab"]).unwrap();
        assert!(filter.matches(&metadata()));

        assert!(MetadataFilter::parse_pairs(["crop"]).is_err());
        assert!(MetadataFilter::parse_pairs(["=rice"]).is_err());
    }
}
