//! Citation coverage and unsupported-claim heuristics

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::retrieval::RetrievedDocument;

static SOURCE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[Source (\d+)\]").unwrap());

static NUMERIC_CLAIM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)?(?:\s*(?:percent|%|rupees|rs|kg|quintal|acre|hectare))").unwrap()
});

static CHEMICAL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-Z][a-z]*(?:azole|mycin|bendazim|conazole|thiram|captan|mancozeb)\b|\b[A-Z][a-z]*\s+\d+(?:\.\d+)?%?\s*(?:EC|WP|SL|G)\b",
    )
    .unwrap()
});

/// Threshold the grounding score must exceed to count as well grounded
pub const WELL_GROUNDED_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundingValidation {
    /// Distinct cited sources that exist, over supplied sources; in [0, 1]
    pub grounding_score: f64,
    pub total_sources: usize,
    pub referenced_sources: usize,
    pub source_references: Vec<String>,
    pub hallucination_indicators: Vec<String>,
    pub hallucination_risk: bool,
    pub well_grounded: bool,
}

/// Validate an answer against the documents it was supposed to be drawn from.
///
/// The claim checks are pattern heuristics: a number with a unit or a
/// pesticide-shaped name that does not appear verbatim in any document is
/// reported.
pub fn validate_grounding(answer: &str, documents: &[RetrievedDocument]) -> GroundingValidation {
    let total_sources = documents.len();
    let mut source_references = Vec::new();
    let mut cited = HashSet::new();

    for caps in SOURCE_MARKER.captures_iter(answer) {
        source_references.push(caps[0].to_string());

        // markers pointing past the supplied documents never count
        if let Ok(n) = caps[1].parse::<usize>() {
            if (1..=total_sources).contains(&n) {
                cited.insert(n);
            }
        }
    }

    let referenced_sources = cited.len();
    let grounding_score = referenced_sources as f64 / total_sources.max(1) as f64;

    let hallucination_indicators = detect_unsupported_claims(answer, documents);
    let hallucination_risk = !hallucination_indicators.is_empty();

    GroundingValidation {
        grounding_score,
        total_sources,
        referenced_sources,
        source_references,
        well_grounded: grounding_score > WELL_GROUNDED_SCORE && !hallucination_risk,
        hallucination_indicators,
        hallucination_risk,
    }
}

fn detect_unsupported_claims(answer: &str, documents: &[RetrievedDocument]) -> Vec<String> {
    let evidence = documents
        .iter()
        .map(|doc| doc.content.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut indicators = Vec::new();

    for claim in NUMERIC_CLAIM.find_iter(&answer.to_lowercase()) {
        if !evidence.contains(claim.as_str()) {
            indicators.push(format!("Unsupported numeric claim: {}", claim.as_str()));
        }
    }

    for mention in CHEMICAL_NAME.find_iter(answer) {
        if !evidence.contains(&mention.as_str().to_lowercase()) {
            indicators.push(format!(
                "Unsupported chemical/product mention: {}",
                mention.as_str()
            ));
        }
    }

    indicators
}
