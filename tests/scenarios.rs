// file: tests/scenarios.rs
// description: end-to-end ingest and question-answering flows against in-memory collaborators
// reference: exercises QaService with a fixed extractor and generator

use async_trait::async_trait;
use pdf_qa::answer::Language;
use pdf_qa::answer::messages::{NO_DOCUMENTS, NO_RESPONSE, NOT_FOUND_EN, NOT_FOUND_HI};
use pdf_qa::config::{EmbeddingProvider, StorageBackend};
use pdf_qa::history::TranscriptStore;
use pdf_qa::{
    AnswerGenerator, AnswerOutcome, CheckState, Config, DocumentExtractor, HashingEmbedder,
    MemoryVectorStore, PageContent, PassageKind, PipelineError, ProgressTracker, QaService,
    QueryResponse, Result, ServiceParts,
};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct FixedExtractor {
    pages: Vec<PageContent>,
}

impl DocumentExtractor for FixedExtractor {
    fn extract(&self, _path: &Path, progress: &ProgressTracker) -> Result<Vec<PageContent>> {
        progress.start_document("fixture", self.pages.len());
        for _ in &self.pages {
            progress.inc_page();
        }
        Ok(self.pages.clone())
    }
}

enum Reply {
    Text(&'static str),
    Fail,
}

struct StaticGenerator {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl StaticGenerator {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AnswerGenerator for StaticGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.reply {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::Fail => Err(PipelineError::Generation("model offline".to_string())),
        }
    }
}

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default_config();
    config.storage.backend = StorageBackend::Memory;
    config.embedding.provider = EmbeddingProvider::Hashing;
    config.embedding.dimension = 256;
    config.ocr.enabled = false;
    config.retrieval.min_relevance = 0.0;
    config.answer.history_path = dir.path().join("chat_history.json");
    config
}

fn service(dir: &TempDir, pages: Vec<PageContent>, generator: Arc<StaticGenerator>) -> QaService {
    let config = test_config(dir);
    QaService::new(ServiceParts {
        store: Arc::new(MemoryVectorStore::new()),
        embedder: Arc::new(HashingEmbedder::new(config.embedding.dimension)),
        extractor: Arc::new(FixedExtractor { pages }),
        generator,
        config,
    })
    .unwrap()
}

fn pdf(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"%PDF-1.4").unwrap();
    path
}

fn revenue_page() -> PageContent {
    PageContent::new("Revenue grew by 12% in 2023.", "")
}

#[tokio::test]
async fn answers_english_question_from_text_page() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("Revenue grew by 12% in 2023."));
    let service = service(&dir, vec![revenue_page()], generator.clone());

    let report = service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();
    assert_eq!(report.chunk_count, 1);
    assert_eq!(report.index_location, "memory://");

    let record = service.ask("What was the revenue growth?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::Answered);
    assert_eq!(record.grounded_answer, "Revenue grew by 12% in 2023.");
    assert!(record.grounded_answer.contains("12%"));
    assert_eq!(record.sources.len(), 1);
    assert_eq!(record.sources[0].passage.source, "report.pdf");
    assert_eq!(record.sources[0].passage.page, 1);
    assert_eq!(record.sources[0].passage.text, "Revenue grew by 12% in 2023.");
    assert_eq!(generator.calls(), 1);
    assert!(generator.last_prompt().contains("Revenue grew by 12% in 2023."));
    assert!(generator.last_prompt().contains("What was the revenue growth?"));
}

#[tokio::test]
async fn answers_hindi_question_from_scanned_page() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("अनुमोदन तिथि 10 जनवरी है।"));
    let page = PageContent::new("", "अनुमोदन तिथि: 10 जनवरी");
    let service = service(&dir, vec![page], generator.clone());

    let report = service.ingest(&pdf(&dir, "scan.pdf")).await.unwrap();
    assert_eq!(report.stats.ocr_only_pages, 1);

    let record = service.ask("अनुमोदन तिथि क्या है?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::Answered);
    assert_eq!(record.grounded_answer, "अनुमोदन तिथि 10 जनवरी है।");
    assert!(record.grounded_answer.contains("10 जनवरी"));
    assert_eq!(Language::detect(&record.grounded_answer), Language::Hindi);
    assert_eq!(record.sources.len(), 1);
    assert_eq!(record.sources[0].passage.text, "अनुमोदन तिथि: 10 जनवरी");
    assert_eq!(record.sources[0].passage.kind, PassageKind::Text);
    assert_eq!(record.sources[0].passage.page, 1);
    assert!(generator.last_prompt().contains("अनुमोदन तिथि: 10 जनवरी"));
}

#[tokio::test]
async fn scanned_page_drops_stray_text_layer() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("अनुमोदन तिथि 10 जनवरी 2024 है।"));
    let page = PageContent::new(
        "  3 ",
        "अनुमोदन तिथि 10 जनवरी 2024 है। यह परियोजना गांधीनगर में स्थित है।",
    );
    let service = service(&dir, vec![page], generator);
    service.ingest(&pdf(&dir, "scan.pdf")).await.unwrap();

    let record = service.ask("अनुमोदन तिथि क्या है?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::Answered);
    assert!(!record.sources[0].passage.text.contains('3'));
}

#[tokio::test]
async fn empty_index_returns_no_documents_without_generating() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("anything"));
    let service = service(&dir, Vec::new(), generator.clone());

    let record = service.ask("What is the approval date?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::NoDocuments);
    assert_eq!(record.grounded_answer, NO_DOCUMENTS);
    assert!(record.sources.is_empty());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn unsupported_answer_becomes_not_found() {
    let dir = TempDir::new().unwrap();
    let generator =
        StaticGenerator::new(Reply::Text("Photosynthesis converts sunlight to chemical energy."));
    let service = service(&dir, vec![revenue_page()], generator);
    service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();

    let record = service.ask("What was the revenue growth?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::NotFound);
    assert_eq!(record.grounded_answer, NOT_FOUND_EN);
    assert_eq!(record.raw_answer, "Photosynthesis converts sunlight to chemical energy.");
    assert!(!record.sources.is_empty());
}

#[tokio::test]
async fn sentinel_reply_is_localized() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("NOT_FOUND"));
    let service = service(&dir, vec![revenue_page()], generator);
    service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();

    let record = service.ask("मुख्य कार्यालय कहाँ है?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::NotFound);
    assert_eq!(record.grounded_answer, NOT_FOUND_HI);
}

#[tokio::test]
async fn generation_failure_keeps_sources() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Fail);
    let service = service(&dir, vec![revenue_page()], generator);
    service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();

    let record = service.ask("What was the revenue growth?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::GenerationFailed);
    assert_eq!(record.grounded_answer, NO_RESPONSE);
    assert_eq!(record.sources.len(), 1);
}

#[tokio::test]
async fn blank_generation_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("  \n "));
    let service = service(&dir, vec![revenue_page()], generator);
    service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();

    let record = service.ask("What was the revenue growth?").await.unwrap();

    assert_eq!(record.outcome, AnswerOutcome::GenerationFailed);
    assert_eq!(record.grounded_answer, NO_RESPONSE);
}

#[tokio::test]
async fn table_rows_are_cited_individually() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("- Acme Ltd is in Gandhinagar."));
    let page = PageContent::new("Registered suppliers for the current financial year.", "")
        .with_tables(vec![
            "Company,Location\nAcme Ltd,Gandhinagar\nBeta Corp,Ahmedabad\n".to_string(),
        ]);
    let service = service(&dir, vec![page], generator);

    let report = service.ingest(&pdf(&dir, "suppliers.pdf")).await.unwrap();
    assert_eq!(report.chunk_count, 4);

    let record = service.ask("Which company is in Gandhinagar?").await.unwrap();
    let response = QueryResponse::from(&record);

    assert_eq!(record.outcome, AnswerOutcome::Answered);
    assert!(
        response
            .sources
            .iter()
            .any(|s| s.kind == PassageKind::TableRow && s.content == "Acme Ltd | Gandhinagar")
    );
}

#[tokio::test]
async fn clear_index_empties_the_store() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("unused"));
    let service = service(&dir, vec![revenue_page()], generator.clone());
    service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();
    assert_eq!(service.document_count().await.unwrap(), 1);

    service.clear_index().await.unwrap();

    assert_eq!(service.document_count().await.unwrap(), 0);
    let record = service.ask("What was the revenue growth?").await.unwrap();
    assert_eq!(record.outcome, AnswerOutcome::NoDocuments);
    assert_eq!(generator.calls(), 0);
    service.close().await.unwrap();
}

#[tokio::test]
async fn reset_clears_index_and_chat_history() {
    let dir = TempDir::new().unwrap();
    let generator = StaticGenerator::new(Reply::Text("Revenue grew by 12% in 2023."));
    let service = service(&dir, vec![revenue_page()], generator);
    service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();

    let history_path = service.config().answer.history_path.clone();
    let record = service.ask("What was the revenue growth?").await.unwrap();
    let mut history = TranscriptStore::open(history_path.clone()).await.unwrap();
    history.record(&record).await.unwrap();
    assert_eq!(history.len(), 2);

    service.reset().await.unwrap();

    assert_eq!(service.document_count().await.unwrap(), 0);
    let reopened = TranscriptStore::open(history_path).await.unwrap();
    assert!(reopened.is_empty());
}

#[tokio::test]
async fn missing_pdf_fails_before_indexing() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, vec![revenue_page()], StaticGenerator::new(Reply::Text("x")));

    let result = service.ingest(&dir.path().join("missing.pdf")).await;

    assert!(matches!(result, Err(PipelineError::FileNotFound(_))));
    assert_eq!(service.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn search_returns_ranked_passages() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, vec![revenue_page()], StaticGenerator::new(Reply::Text("x")));
    service.ingest(&pdf(&dir, "report.pdf")).await.unwrap();

    let results = service.search("revenue growth", 3).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results.hits[0].relevance > 0.0);
}

#[tokio::test]
async fn health_report_covers_index_and_generator() {
    let dir = TempDir::new().unwrap();
    let service = service(&dir, Vec::new(), StaticGenerator::new(Reply::Text("x")));

    let report = service.health_report().await;

    assert_eq!(report.vector_index.state, CheckState::Ok);
    assert_eq!(report.vector_index.detail, "0 passages at memory://");
    assert_eq!(report.embedding.state, CheckState::Ok);
    assert_eq!(report.generator.state, CheckState::Ok);
    assert_eq!(report.tesseract.state, CheckState::Warning);
    assert_eq!(report.components().len(), 5);
}
