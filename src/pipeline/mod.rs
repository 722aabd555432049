// file: src/pipeline/mod.rs
// description: ingestion and question-answering pipeline module exports
// reference: internal module structure

pub mod ingest;
pub mod progress;
pub mod service;

pub use ingest::{IngestReport, IngestionPipeline};
pub use progress::{IngestStats, ProgressTracker};
pub use service::{QaService, ServiceParts};
