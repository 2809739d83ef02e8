//! Bounded context window assembled from ranked documents

use tracing::debug;

use crate::domain::retrieval::RetrievedDocument;

pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 4000;

/// Rendered context and how many documents made it in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltContext {
    pub text: String,
    pub documents_included: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    max_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_LENGTH)
    }
}

impl ContextBuilder {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Render documents in order, stopping at the first one that would
    /// push the context past `max_chars`.
    pub fn build(&self, documents: &[RetrievedDocument]) -> BuiltContext {
        let mut text = String::new();
        let mut length = 0;
        let mut documents_included = 0;

        for (i, doc) in documents.iter().enumerate() {
            let block = render_block(i + 1, doc);
            let block_len = block.chars().count();

            if length + block_len > self.max_chars {
                debug!(
                    included = documents_included,
                    dropped = documents.len() - documents_included,
                    "Context length limit reached"
                );
                break;
            }

            text.push_str(&block);
            length += block_len;
            documents_included += 1;
        }

        BuiltContext {
            text,
            documents_included,
        }
    }
}

fn render_block(number: usize, doc: &RetrievedDocument) -> String {
    let mut provenance = format!("Source: {}", doc.source().unwrap_or("Unknown"));

    if let Some(crop) = doc.crop() {
        provenance.push_str(&format!(", Crop: {}", crop));
    }
    if let Some(category) = doc.category() {
        provenance.push_str(&format!(", Category: {}", category));
    }

    format!("[Source {}] {}\n{}\n\n", number, provenance, doc.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, content: &str) -> RetrievedDocument {
        RetrievedDocument::new(id, content, 0.9, "agricultural_knowledge")
    }

    #[test]
    fn test_block_format() {
        let docs = vec![
            doc("a", "Spray at dusk.")
                .with_metadata("source", json!("ICAR"))
                .with_metadata("crop", json!("tomato"))
                .with_metadata("category", json!("pest_management")),
            doc("b", "Irrigate weekly."),
        ];

        let context = ContextBuilder::default().build(&docs);

        assert_eq!(
            context.text,
            "[Source 1] Source: ICAR, Crop: tomato, Category: pest_management\nSpray at dusk.\n\n\
             [Source 2] Source: Unknown\nIrrigate weekly.\n\n"
        );
        assert_eq!(context.documents_included, 2);
    }

    #[test]
    fn test_never_exceeds_limit_and_drops_only_suffix() {
        let docs: Vec<_> = (0..10)
            .map(|i| doc(&format!("d{}", i), &"x".repeat(100 + i * 37)))
            .collect();

        for max in [0, 50, 130, 400, 1000, 4000] {
            let context = ContextBuilder::new(max).build(&docs);

            assert!(context.text.chars().count() <= max);
            for n in 1..=context.documents_included {
                assert!(context.text.contains(&format!("[Source {}]", n)));
            }
            assert!(
                !context
                    .text
                    .contains(&format!("[Source {}]", context.documents_included + 1))
            );
        }
    }

    #[test]
    fn test_stops_at_first_oversized_document() {
        let docs = vec![doc("a", "short"), doc("b", &"y".repeat(500)), doc("c", "tiny")];

        let context = ContextBuilder::new(200).build(&docs);

        assert_eq!(context.documents_included, 1);
        assert!(!context.text.contains("tiny"));
    }

    #[test]
    fn test_length_measured_in_characters() {
        let hindi = "गेहूं की बुवाई नवंबर में करें";
        let block = format!("[Source 1] Source: Unknown\n{}\n\n", hindi);
        let max = block.chars().count();

        let context = ContextBuilder::new(max).build(&[doc("a", hindi)]);
        assert_eq!(context.documents_included, 1);
    }
}
