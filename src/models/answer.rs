// file: src/models/answer.rs
// description: answer record and query response returned to callers
// reference: internal data structures

use super::passage::PassageMetadata;
use super::search_result::ScoredPassage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// A grounded, normalized answer.
    Answered,
    /// The generator refused or its answer had no support in the passages.
    NotFound,
    /// The index was empty when the question arrived.
    NoDocuments,
    /// The generator failed or produced blank text.
    GenerationFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub raw_answer: String,
    pub grounded_answer: String,
    pub sources: Vec<ScoredPassage>,
    pub outcome: AnswerOutcome,
    pub created_at: DateTime<Utc>,
}

impl AnswerRecord {
    pub fn new(
        question: impl Into<String>,
        raw_answer: impl Into<String>,
        grounded_answer: impl Into<String>,
        sources: Vec<ScoredPassage>,
        outcome: AnswerOutcome,
    ) -> Self {
        Self {
            question: question.into(),
            raw_answer: raw_answer.into(),
            grounded_answer: grounded_answer.into(),
            sources,
            outcome,
            created_at: Utc::now(),
        }
    }

    pub fn citations(&self) -> Vec<PassageMetadata> {
        self.sources
            .iter()
            .map(|hit| PassageMetadata::from(&hit.passage))
            .collect()
    }
}

/// The `{answer, sources}` shape handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<PassageMetadata>,
}

impl From<&AnswerRecord> for QueryResponse {
    fn from(record: &AnswerRecord) -> Self {
        Self {
            answer: record.grounded_answer.clone(),
            sources: record.citations(),
        }
    }
}
