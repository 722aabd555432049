// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns

//! Multilingual (English, Hindi, Hinglish) question answering over PDF documents.
//!
//! PDFs are split into pages, their text layer, OCR output and detected tables are
//! assembled into passages, and the passages are embedded into a vector index.
//! Questions retrieve a relevant and diverse set of passages, a language model drafts
//! an answer from them, and the answer is kept only when it is grounded in the
//! retrieved text.

pub mod answer;
pub mod config;
pub mod database;
pub mod error;
pub mod extractor;
pub mod history;
pub mod library;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod retrieval;
pub mod utils;

pub use answer::{AnswerGenerator, AnswerNormalizer, ChatCompletionClient, GroundingValidator};
pub use config::Config;
pub use database::{
    Embedder, HashingEmbedder, HttpEmbeddingClient, LanceVectorStore, MemoryVectorStore,
    SearchParams, VectorIndex, VectorStore,
};
pub use error::{PipelineError, Result};
pub use extractor::{DocumentExtractor, PageContent, PdfPageExtractor};
pub use history::TranscriptStore;
pub use models::{
    AnswerOutcome, AnswerRecord, Passage, PassageDraft, PassageKind, PassageMetadata,
    QueryResponse, RetrievalResult, ScoredPassage,
};
pub use parser::{Chunker, DocumentAssembler};
pub use pipeline::{IngestReport, IngestStats, ProgressTracker, QaService, ServiceParts};
pub use retrieval::Retriever;
pub use utils::{CheckState, ComponentCheck, PromptTemplate, SetupReport, StageTimer, Validator};
