//! Answers produced without generation

use crate::domain::retrieval::RetrievedDocument;

const NO_DOCUMENTS_EN: &str = "I don't have specific information about your query in my knowledge \
base. Please consult with local agricultural experts or extension officers for accurate guidance.";

const NO_DOCUMENTS_HI: &str = "मेरे पास आपके प्रश्न के बारे में विशिष्ट जानकारी नहीं है। कृपया सटीक \
मार्गदर्शन के लिए स्थानीय कृषि विशेषज्ञों या विस्तार अधिकारियों से सलाह लें।";

const SNIPPET_CHARS: usize = 200;

/// Static answer for a query with no retrieved documents
pub fn no_documents_answer(language: &str) -> &'static str {
    match language {
        "hi" => NO_DOCUMENTS_HI,
        _ => NO_DOCUMENTS_EN,
    }
}

/// Coarse topic of a query, picked from keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    Disease,
    Market,
    Scheme,
    General,
}

impl QueryIntent {
    pub fn detect(query: &str) -> Self {
        let query = query.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| query.contains(w));

        if mentions(&["disease", "pest", "problem", "symptom"]) {
            Self::Disease
        } else if mentions(&["price", "market", "sell", "mandi"]) {
            Self::Market
        } else if mentions(&["scheme", "subsidy", "government", "benefit"]) {
            Self::Scheme
        } else {
            Self::General
        }
    }

    fn generic_sentence(self) -> &'static str {
        match self {
            Self::Disease | Self::General => {
                "Based on the available agricultural knowledge, here's what I found relevant to your query."
            }
            Self::Market => {
                "Based on the available market intelligence, here's what I found relevant to your query."
            }
            Self::Scheme => {
                "Based on the available government scheme information, here's what I found relevant to your query."
            }
        }
    }
}

/// Assemble an answer directly from document snippets, citing each one used
pub fn template_answer(query: &str, documents: &[RetrievedDocument]) -> String {
    let intent = QueryIntent::detect(query);

    let sentences: Vec<String> = documents
        .iter()
        .enumerate()
        .filter_map(|(i, doc)| snippet_sentence(intent, i + 1, doc))
        .collect();

    if sentences.is_empty() {
        intent.generic_sentence().to_string()
    } else {
        sentences.join(" ")
    }
}

fn snippet_sentence(intent: QueryIntent, number: usize, doc: &RetrievedDocument) -> Option<String> {
    let content = doc.content.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| content.contains(w));
    let category = doc.category();
    let snippet: String = doc.content.chars().take(SNIPPET_CHARS).collect();

    let lead = match intent {
        QueryIntent::Disease => {
            if category == Some("disease_management") {
                format!("According to {}", doc.source().unwrap_or("agricultural sources"))
            } else if mentions(&["disease", "pest"]) {
                format!("Based on {}", doc.source().unwrap_or("available information"))
            } else {
                return None;
            }
        }
        QueryIntent::Market => {
            if category == Some("market_intelligence") {
                format!(
                    "According to market data from {}",
                    doc.source().unwrap_or("market sources")
                )
            } else if mentions(&["price", "market", "mandi"]) {
                format!("Based on {}", doc.source().unwrap_or("available information"))
            } else {
                return None;
            }
        }
        QueryIntent::Scheme => {
            if category == Some("government_scheme") {
                format!(
                    "According to official information about {}",
                    doc.metadata_str("scheme_name").unwrap_or("government scheme")
                )
            } else if mentions(&["scheme", "subsidy", "government"]) {
                format!("Based on {}", doc.source().unwrap_or("government sources"))
            } else {
                return None;
            }
        }
        QueryIntent::General => {
            format!("According to {}", doc.source().unwrap_or("agricultural sources"))
        }
    };

    Some(format!("{} [Source {}], {}...", lead, number, snippet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(content: &str) -> RetrievedDocument {
        RetrievedDocument::new("d", content, 0.8, "agricultural_knowledge")
    }

    #[test]
    fn test_no_documents_answer_per_language() {
        assert!(no_documents_answer("en").starts_with("I don't have specific information"));
        assert!(no_documents_answer("hi").starts_with("मेरे पास"));
        assert_eq!(no_documents_answer("ta"), no_documents_answer("en"));
    }

    #[test]
    fn test_intent_detection() {
        assert_eq!(QueryIntent::detect("Pest on my cotton"), QueryIntent::Disease);
        assert_eq!(QueryIntent::detect("Onion MANDI rate"), QueryIntent::Market);
        assert_eq!(QueryIntent::detect("drip irrigation subsidy"), QueryIntent::Scheme);
        assert_eq!(QueryIntent::detect("when to sow wheat"), QueryIntent::General);
        // disease keywords win over market keywords
        assert_eq!(QueryIntent::detect("pest problem and market price"), QueryIntent::Disease);
    }

    #[test]
    fn test_general_answer_cites_every_document() {
        let docs = vec![
            doc("Sow wheat in November.").with_metadata("source", json!("KVK Karnal")),
            doc("Use 100 kg seed per hectare."),
        ];

        let answer = template_answer("wheat sowing", &docs);

        assert_eq!(
            answer,
            "According to KVK Karnal [Source 1], Sow wheat in November.... \
             According to agricultural sources [Source 2], Use 100 kg seed per hectare...."
        );
    }

    #[test]
    fn test_disease_answer_skips_unrelated_documents() {
        let docs = vec![
            doc("Mandi prices are rising."),
            doc("Blast disease appears as spindle lesions.").with_metadata("source", json!("IRRI")),
            doc("Spray at first sign.")
                .with_metadata("category", json!("disease_management"))
                .with_metadata("source", json!("TNAU")),
        ];

        let answer = template_answer("disease on rice", &docs);

        assert!(answer.starts_with("Based on IRRI [Source 2], Blast disease"));
        assert!(answer.contains("According to TNAU [Source 3], Spray at first sign...."));
        assert!(!answer.contains("[Source 1]"));
    }

    #[test]
    fn test_generic_sentence_when_nothing_matches() {
        let answer = template_answer("scheme for tractors", &[doc("Irrigate weekly.")]);
        assert_eq!(
            answer,
            "Based on the available government scheme information, here's what I found relevant to your query."
        );
    }

    #[test]
    fn test_snippet_truncated_to_200_chars() {
        let long = "ज".repeat(300);
        let answer = template_answer("general", &[doc(&long)]);
        assert!(answer.ends_with(&format!("{}...", "ज".repeat(200))));
        assert!(!answer.contains(&"ज".repeat(201)));
    }
}
