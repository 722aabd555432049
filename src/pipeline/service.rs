// file: src/pipeline/service.rs
// description: question-answering service wiring ingestion, retrieval and answer policy
// reference: coordinates the query flow from retrieval to normalized answer

use crate::answer::messages::{NO_DOCUMENTS, NO_RESPONSE, not_found_for};
use crate::answer::{
    AnswerGenerator, AnswerNormalizer, ChatCompletionClient, GroundingValidator, Language, Verdict,
};
use crate::config::{Config, EmbeddingProvider, StorageBackend};
use crate::database::{
    Embedder, HashingEmbedder, HttpEmbeddingClient, LanceVectorStore, MemoryVectorStore,
    VectorIndex, VectorStore,
};
use crate::error::Result;
use crate::extractor::page::probe_library;
use crate::extractor::{DocumentExtractor, LayoutTableDetector, PdfPageExtractor, TesseractOcr};
use crate::history::TranscriptStore;
use crate::library::PdfScanner;
use crate::models::{AnswerOutcome, AnswerRecord, Passage, RetrievalResult};
use crate::parser::{Chunker, DocumentAssembler};
use crate::pipeline::ingest::{IngestReport, IngestionPipeline};
use crate::pipeline::progress::ProgressTracker;
use crate::retrieval::Retriever;
use crate::utils::template::PromptTemplate;
use crate::utils::{ComponentCheck, SetupReport, StageTimer, Validator};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const SLOW_QUERY: Duration = Duration::from_secs(30);
const SLOW_INGEST: Duration = Duration::from_secs(300);

/// Collaborators the service runs against.
pub struct ServiceParts {
    pub config: Config,
    pub store: Arc<dyn VectorStore>,
    pub embedder: Arc<dyn Embedder>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub generator: Arc<dyn AnswerGenerator>,
}

pub struct QaService {
    config: Config,
    index: Arc<VectorIndex>,
    retriever: Retriever,
    ingestion: IngestionPipeline,
    scanner: PdfScanner,
    generator: Arc<dyn AnswerGenerator>,
    template: PromptTemplate,
    validator: GroundingValidator,
    normalizer: AnswerNormalizer,
}

impl QaService {
    pub fn new(parts: ServiceParts) -> Result<Self> {
        let ServiceParts {
            config,
            store,
            embedder,
            extractor,
            generator,
        } = parts;
        config.validate()?;

        let index = Arc::new(VectorIndex::new(store, embedder, config.embedding.batch_size));
        let chunker = Chunker::new(config.ingest.chunk_size, config.ingest.chunk_overlap)?;
        let assembler = DocumentAssembler::new(config.ingest.scanned_page_threshold);
        let template = match &config.generation.prompt_path {
            Some(path) => PromptTemplate::from_file(path)?,
            None => PromptTemplate::new(),
        };

        Ok(Self {
            retriever: Retriever::new(index.clone(), &config.retrieval),
            ingestion: IngestionPipeline::new(extractor, assembler, chunker, index.clone()),
            scanner: PdfScanner::new(&config.ingest),
            validator: GroundingValidator::new(config.answer.min_shared_tokens),
            normalizer: AnswerNormalizer::new(),
            index,
            generator,
            template,
            config,
        })
    }

    /// Builds the production collaborators named by the configuration.
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn VectorStore> = match config.storage.backend {
            StorageBackend::Lancedb => Arc::new(
                LanceVectorStore::new(config.storage.clone(), config.embedding.dimension).await?,
            ),
            StorageBackend::Memory => Arc::new(MemoryVectorStore::new()),
        };

        let embedder: Arc<dyn Embedder> = match config.embedding.provider {
            EmbeddingProvider::Http => Arc::new(HttpEmbeddingClient::new(&config.embedding)?),
            EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(config.embedding.dimension)),
        };

        let extractor = Arc::new(PdfPageExtractor::new(
            &config.ingest,
            &config.ocr,
            Arc::new(TesseractOcr::new(&config.ocr)),
            Arc::new(LayoutTableDetector::new()),
        ));
        let generator = Arc::new(ChatCompletionClient::new(&config.generation)?);

        Self::new(ServiceParts {
            config,
            store,
            embedder,
            extractor,
            generator,
        })
    }

    /// Ingests a PDF file, or every PDF found under a directory.
    pub async fn ingest(&self, path: &Path) -> Result<IngestReport> {
        let mut timer = StageTimer::start("ingest");
        let files = self.scanner.scan(path)?;
        timer.stage("scan");
        debug!("Ingesting {} file(s) from {}", files.len(), path.display());

        let progress = Arc::new(if self.config.ingest.show_progress {
            ProgressTracker::new()
        } else {
            ProgressTracker::hidden()
        });

        let result = if path.is_file() {
            self.ingestion.ingest(path, progress.clone()).await
        } else {
            let paths: Vec<_> = files.into_iter().map(|f| f.path).collect();
            self.ingestion.ingest_many(&paths, progress.clone()).await
        };
        progress.finish();
        timer.stage("index");

        let report = result?;
        timer.finish(SLOW_INGEST);
        Ok(report)
    }

    pub async fn ask(&self, question: &str) -> Result<AnswerRecord> {
        Validator::validate_question(question)?;
        let mut timer = StageTimer::start("ask");
        debug!(language = Language::detect(question).as_str(), "Answering question");

        if self.index.count().await? == 0 {
            info!("Question received with an empty index");
            return Ok(AnswerRecord::new(
                question,
                "",
                NO_DOCUMENTS,
                Vec::new(),
                AnswerOutcome::NoDocuments,
            ));
        }

        let retrieved = self.retriever.retrieve(question).await?;
        timer.stage("retrieve");

        if retrieved.is_empty() {
            debug!("No passage cleared the relevance threshold");
            return Ok(AnswerRecord::new(
                question,
                "",
                not_found_for(question),
                Vec::new(),
                AnswerOutcome::NotFound,
            ));
        }

        let prompt = self.template.render(&retrieved.context(), question);
        let raw = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Generator returned blank text");
                return Ok(self.failed(question, String::new(), retrieved));
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                return Ok(self.failed(question, String::new(), retrieved));
            }
        };

        timer.stage("generate");

        let record = self.ground(question, raw, retrieved);
        timer.stage("ground");
        timer.finish(SLOW_QUERY);
        Ok(record)
    }

    fn failed(&self, question: &str, raw: String, retrieved: RetrievalResult) -> AnswerRecord {
        AnswerRecord::new(
            question,
            raw,
            NO_RESPONSE,
            retrieved.hits,
            AnswerOutcome::GenerationFailed,
        )
    }

    fn ground(&self, question: &str, raw: String, retrieved: RetrievalResult) -> AnswerRecord {
        let passages: Vec<&Passage> = retrieved.passages().collect();

        match self.validator.assess(&raw, &passages) {
            Verdict::Grounded => {
                let answer = self.normalizer.normalize(&raw);
                AnswerRecord::new(question, raw, answer, retrieved.hits, AnswerOutcome::Answered)
            }
            Verdict::Sentinel => {
                debug!("Generator reported the answer is not in the context");
                AnswerRecord::new(
                    question,
                    raw,
                    not_found_for(question),
                    retrieved.hits,
                    AnswerOutcome::NotFound,
                )
            }
            Verdict::Unsupported { shared } => {
                info!("Discarding answer sharing only {} tokens with the context", shared);
                AnswerRecord::new(
                    question,
                    raw,
                    not_found_for(question),
                    retrieved.hits,
                    AnswerOutcome::NotFound,
                )
            }
        }
    }

    /// Raw retrieval with the configured policy and a caller-chosen size.
    pub async fn search(&self, query: &str, limit: usize) -> Result<RetrievalResult> {
        Validator::validate_question(query)?;
        self.retriever.retrieve_top(query, limit).await
    }

    pub async fn clear_index(&self) -> Result<()> {
        self.index.clear().await
    }

    /// Clears the index, then the chat transcript whose citations pointed into it.
    /// The transcript is left alone if the index could not be cleared.
    pub async fn reset(&self) -> Result<()> {
        self.index.clear().await?;
        let mut history = TranscriptStore::open(self.config.answer.history_path.clone()).await?;
        let dropped = history.len();
        history.clear().await?;
        info!("Index cleared; dropped {} chat history entries", dropped);
        Ok(())
    }

    pub async fn document_count(&self) -> Result<usize> {
        self.index.count().await
    }

    pub fn index_location(&self) -> String {
        self.index.location()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the index and model clients. Pending writes have already completed
    /// because every insert is awaited.
    pub async fn close(self) -> Result<()> {
        let count = self.index.count().await?;
        info!(
            "Closing service with {} passages at {}",
            count,
            self.index.location()
        );
        Ok(())
    }

    /// Probes pdfium, tesseract, the index, the embedding model and the generator.
    pub async fn health_report(&self) -> SetupReport {
        let started = Instant::now();
        let pdfium = match probe_library(self.config.ingest.pdfium_library_dir.as_deref()) {
            Ok(()) => ComponentCheck::ok("library bound", started),
            Err(e) => ComponentCheck::failed(e.to_string(), started),
        };

        let started = Instant::now();
        let tesseract = if !self.config.ocr.enabled {
            ComponentCheck::warning("OCR disabled; scanned pages yield no text", started)
        } else {
            match TesseractOcr::new(&self.config.ocr).version() {
                Ok(version) => ComponentCheck::ok(version, started),
                Err(e) => ComponentCheck::warning(
                    format!("{}; scanned pages yield no text", e),
                    started,
                ),
            }
        };

        let started = Instant::now();
        let vector_index = match self.index.count().await {
            Ok(count) => ComponentCheck::ok(
                format!("{} passages at {}", count, self.index.location()),
                started,
            ),
            Err(e) => ComponentCheck::failed(e.to_string(), started),
        };

        let started = Instant::now();
        let embedder = self.index.embedder();
        let embedding = match embedder.embed_one("health check").await {
            Ok(vector) if vector.len() == embedder.dimension() => {
                ComponentCheck::ok(format!("{} dimensions", vector.len()), started)
            }
            Ok(vector) => ComponentCheck::failed(
                format!(
                    "expected {} dimensions, model returned {}",
                    embedder.dimension(),
                    vector.len()
                ),
                started,
            ),
            Err(e) => ComponentCheck::failed(e.to_string(), started),
        };

        let started = Instant::now();
        let generator = match self.generator.health_check().await {
            Ok(()) => ComponentCheck::ok("reachable", started),
            Err(e) => ComponentCheck::failed(e.to_string(), started),
        };

        SetupReport {
            pdfium,
            tesseract,
            vector_index,
            embedding,
            generator,
            checked_at: Utc::now(),
        }
    }
}
