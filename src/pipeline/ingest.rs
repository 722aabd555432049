// file: src/pipeline/ingest.rs
// description: pdf to passage ingestion: extract, assemble, chunk and index
// reference: orchestrates blocking extraction and asynchronous indexing

use crate::database::VectorIndex;
use crate::error::{PipelineError, Result};
use crate::extractor::DocumentExtractor;
use crate::models::{PassageDraft, PassageKind};
use crate::parser::{AssembledDocument, Chunker, DocumentAssembler};
use crate::pipeline::progress::{IngestStats, ProgressTracker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub chunk_count: usize,
    pub index_location: String,
    pub stats: IngestStats,
}

pub struct IngestionPipeline {
    extractor: Arc<dyn DocumentExtractor>,
    assembler: DocumentAssembler,
    chunker: Chunker,
    index: Arc<VectorIndex>,
}

impl IngestionPipeline {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        assembler: DocumentAssembler,
        chunker: Chunker,
        index: Arc<VectorIndex>,
    ) -> Self {
        Self {
            extractor,
            assembler,
            chunker,
            index,
        }
    }

    /// Indexes one document. Nothing is written unless extraction, chunking
    /// and embedding all succeed.
    pub async fn ingest(&self, path: &Path, progress: Arc<ProgressTracker>) -> Result<IngestReport> {
        let drafts = match self.prepare(path, progress.clone()).await {
            Ok(drafts) => drafts,
            Err(e) => {
                progress.inc_documents_failed();
                return Err(e);
            }
        };
        progress.inc_documents_processed();

        self.commit(drafts, &progress).await
    }

    /// Indexes several documents in one write. The first document that fails
    /// aborts the call and nothing from any of them is written.
    pub async fn ingest_many(
        &self,
        paths: &[PathBuf],
        progress: Arc<ProgressTracker>,
    ) -> Result<IngestReport> {
        let mut drafts = Vec::new();

        for path in paths {
            match self.prepare(path, progress.clone()).await {
                Ok(mut document) => {
                    progress.inc_documents_processed();
                    drafts.append(&mut document);
                }
                Err(e) => {
                    warn!(
                        "Failed to ingest {}: {}; discarding {} prepared passages",
                        path.display(),
                        e,
                        drafts.len()
                    );
                    progress.inc_documents_failed();
                    return Err(e);
                }
            }
        }

        self.commit(drafts, &progress).await
    }

    async fn commit(&self, drafts: Vec<PassageDraft>, progress: &ProgressTracker) -> Result<IngestReport> {
        progress.set_message(format!("Embedding {} passages", drafts.len()));
        let ids = self.index.insert(drafts).await?;
        progress.add_passages(ids.len());

        info!("Indexed {} passages into {}", ids.len(), self.index.location());

        Ok(IngestReport {
            chunk_count: ids.len(),
            index_location: self.index.location(),
            stats: progress.get_stats(),
        })
    }

    /// Extraction runs on a blocking thread; assembly and chunking are pure.
    pub async fn prepare(&self, path: &Path, progress: Arc<ProgressTracker>) -> Result<Vec<PassageDraft>> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let source = source_name(path);
        let extractor = self.extractor.clone();
        let owned_path = path.to_path_buf();
        let tracker = progress.clone();
        let pages = tokio::task::spawn_blocking(move || extractor.extract(&owned_path, &tracker))
            .await
            .map_err(|e| PipelineError::PdfLoad {
                path: path.to_path_buf(),
                message: format!("Extraction task failed: {}", e),
            })??;

        let document = self.assembler.assemble(&pages, &source);
        progress.add_ocr_only_pages(document.stats.ocr_only_pages);
        debug!(
            "Assembled {}: {} page blocks, {} table units, {} OCR-only pages",
            source,
            document.page_blocks.len(),
            document.table_units.len(),
            document.stats.ocr_only_pages
        );

        Ok(self.chunk_document(document))
    }

    /// Page blocks are split into chunks; table units pass through whole.
    pub fn chunk_document(&self, document: AssembledDocument) -> Vec<PassageDraft> {
        let mut drafts = Vec::new();

        for block in document.page_blocks {
            for chunk in self.chunker.split(&block.text) {
                if let Some(draft) =
                    PassageDraft::new(chunk.text.trim(), block.source.clone(), block.page, PassageKind::Text)
                {
                    drafts.push(draft);
                }
            }
        }

        drafts.extend(document.table_units);
        drafts
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}

/// Passages are attributed to the file name, not the full path.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
