// file: src/models/search_result.rs
// description: Search result model with relevance scores
// reference: Used for vector similarity search results

use super::passage::{Passage, PassageMetadata};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,

    /// Cosine similarity between the query and the passage embedding
    pub relevance: f32,
}

impl ScoredPassage {
    pub fn new(passage: Passage, relevance: f32) -> Self {
        Self { passage, relevance }
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_len: usize) -> String {
        let content_preview = if self.passage.text.chars().count() > max_content_len {
            let head: String = self.passage.text.chars().take(max_content_len).collect();
            format!("{}...", head)
        } else {
            self.passage.text.clone()
        };

        format!(
            "Relevance: {:.4} | {} p.{} [{}]\n{}\n",
            self.relevance,
            self.passage.source,
            self.passage.page,
            self.passage.kind,
            content_preview
        )
    }
}

/// Ordered passages selected for one query, best first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub hits: Vec<ScoredPassage>,
}

impl RetrievalResult {
    pub fn new(hits: Vec<ScoredPassage>) -> Self {
        Self { hits }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.hits.iter().map(|hit| &hit.passage)
    }

    /// Passage texts joined the way they are handed to the generator.
    pub fn context(&self) -> String {
        self.passages()
            .map(|passage| passage.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn citations(&self) -> Vec<PassageMetadata> {
        self.passages().map(PassageMetadata::from).collect()
    }
}
