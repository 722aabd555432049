// file: src/extractor/page.rs
// description: per-page text layer, OCR and table extraction from PDF files
// reference: https://docs.rs/pdfium-render

use crate::config::{IngestConfig, OcrConfig, OcrStrategy};
use crate::error::{PipelineError, Result};
use crate::extractor::ocr::{OcrEngine, enhance};
use crate::extractor::tables::TableDetector;
use crate::pipeline::ProgressTracker;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// OCR output with fewer non-whitespace characters than this counts as nothing.
const MIN_OCR_CHARS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub native_text: String,
    pub ocr_text: String,
    /// CSV renderings in reading order.
    pub tables: Vec<String>,
}

impl PageContent {
    pub fn new(native_text: impl Into<String>, ocr_text: impl Into<String>) -> Self {
        Self {
            native_text: native_text.into(),
            ocr_text: ocr_text.into(),
            tables: Vec::new(),
        }
    }

    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }
}

/// Blocking; callers run it on a blocking thread.
pub trait DocumentExtractor: Send + Sync {
    /// One entry per page, in document order.
    fn extract(&self, path: &Path, progress: &ProgressTracker) -> Result<Vec<PageContent>>;
}

pub struct PdfPageExtractor {
    library_dir: Option<PathBuf>,
    ocr: Option<Arc<dyn OcrEngine>>,
    strategies: Vec<OcrStrategy>,
    render_scale: f32,
    tables: Arc<dyn TableDetector>,
}

impl PdfPageExtractor {
    pub fn new(
        ingest: &IngestConfig,
        ocr_config: &OcrConfig,
        ocr: Arc<dyn OcrEngine>,
        tables: Arc<dyn TableDetector>,
    ) -> Self {
        Self {
            library_dir: ingest.pdfium_library_dir.clone(),
            ocr: ocr_config.enabled.then_some(ocr),
            strategies: ocr_config.strategies.clone(),
            render_scale: ocr_config.render_scale,
            tables,
        }
    }

    fn bind(&self) -> Result<Pdfium> {
        bind_pdfium(self.library_dir.as_deref())
    }

    fn extract_page(&self, page: &PdfPage, number: usize, progress: &ProgressTracker) -> PageContent {
        let native_text = match page.text() {
            Ok(text) => text.all(),
            Err(e) => {
                warn!("Page {} has an unreadable text layer: {}", number, e);
                String::new()
            }
        };

        let tables = match self.tables.detect(&native_text) {
            Ok(tables) => tables,
            Err(e) => {
                warn!("Table detection failed on page {}: {}", number, e);
                progress.inc_table_failure();
                Vec::new()
            }
        };
        progress.add_tables(tables.len());

        let ocr_text = match &self.ocr {
            Some(engine) => self.ocr_page(engine.as_ref(), page, number, progress),
            None => String::new(),
        };

        PageContent {
            native_text,
            ocr_text,
            tables,
        }
    }

    fn ocr_page(
        &self,
        engine: &dyn OcrEngine,
        page: &PdfPage,
        number: usize,
        progress: &ProgressTracker,
    ) -> String {
        let render_config = PdfRenderConfig::new().scale_page_by_factor(self.render_scale);
        let image = match page.render_with_config(&render_config) {
            Ok(bitmap) => bitmap.as_image(),
            Err(e) => {
                warn!("Failed to render page {} for OCR: {}", number, e);
                progress.inc_ocr_failure();
                return String::new();
            }
        };

        match run_strategies(engine, &image, &self.strategies) {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR failed on page {}: {}", number, e);
                progress.inc_ocr_failure();
                String::new()
            }
        }
    }
}

impl DocumentExtractor for PdfPageExtractor {
    fn extract(&self, path: &Path, progress: &ProgressTracker) -> Result<Vec<PageContent>> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| PipelineError::PdfLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let page_count = document.pages().iter().count();
        info!("Extracting {} pages from {}", page_count, name);
        progress.start_document(&name, page_count);

        let mut pages = Vec::with_capacity(page_count);
        for (index, page) in document.pages().iter().enumerate() {
            pages.push(self.extract_page(&page, index + 1, progress));
            progress.inc_page();
        }

        debug!("Extracted {} pages from {}", pages.len(), name);
        Ok(pages)
    }
}

/// Tries each strategy in order and keeps the first non-trivial result.
/// An empty string means every strategy ran but none found text; an error
/// means none of them ran successfully.
pub fn run_strategies(
    engine: &dyn OcrEngine,
    image: &DynamicImage,
    strategies: &[OcrStrategy],
) -> Result<String> {
    let mut last_error = None;
    let mut any_succeeded = false;

    for strategy in strategies {
        let prepared = match strategy {
            OcrStrategy::Enhanced => enhance(image),
            OcrStrategy::Plain => image.clone(),
        };

        match engine.recognize(&prepared) {
            Ok(text) => {
                any_succeeded = true;
                let visible = text.chars().filter(|c| !c.is_whitespace()).count();
                if visible >= MIN_OCR_CHARS {
                    debug!("OCR strategy {:?} produced {} characters", strategy, visible);
                    return Ok(text.trim().to_string());
                }
            }
            Err(e) => {
                debug!("OCR strategy {:?} failed: {}", strategy, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !any_succeeded => Err(e),
        _ => Ok(String::new()),
    }
}

/// Binds from `library_dir` when given, falling back to the system library.
pub fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium> {
    let bindings = match library_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .or_else(|_| Pdfium::bind_to_system_library()),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PipelineError::Config(format!("Failed to load the pdfium library: {}", e)))?;

    Ok(Pdfium::new(bindings))
}

pub fn probe_library(library_dir: Option<&Path>) -> Result<()> {
    bind_pdfium(library_dir).map(|_| ())
}
