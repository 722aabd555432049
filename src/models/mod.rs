// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod answer;
pub mod passage;
pub mod search_result;

pub use answer::{AnswerOutcome, AnswerRecord, QueryResponse};
pub use passage::{Passage, PassageDraft, PassageKind, PassageMetadata};
pub use search_result::{RetrievalResult, ScoredPassage};
