// file: src/parser/assembler.rs
// description: combines per-page text, ocr and table streams into passage drafts
// reference: internal document composition rules

use crate::extractor::PageContent;
use crate::models::{PassageDraft, PassageKind};
use tracing::{debug, warn};

/// Delimiter placed between the cells of one table row.
pub const TABLE_CELL_DELIMITER: &str = " | ";

#[derive(Debug, Clone, Default)]
pub struct AssemblyStats {
    pub ocr_only_pages: usize,
    pub merged_pages: usize,
    pub empty_pages: usize,
    pub table_rows: usize,
    pub verbatim_tables: usize,
}

/// Per-document output: one text block per page that has text, plus table units.
#[derive(Debug, Clone, Default)]
pub struct AssembledDocument {
    pub page_blocks: Vec<PassageDraft>,
    pub table_units: Vec<PassageDraft>,
    pub stats: AssemblyStats,
}

pub struct DocumentAssembler {
    scanned_page_threshold: usize,
}

impl DocumentAssembler {
    pub fn new(scanned_page_threshold: usize) -> Self {
        Self {
            scanned_page_threshold,
        }
    }

    pub fn assemble(&self, pages: &[PageContent], source: &str) -> AssembledDocument {
        let mut document = AssembledDocument::default();

        for (index, page) in pages.iter().enumerate() {
            let page_number = (index + 1) as u32;

            match self.compose_page_text(page, &mut document.stats) {
                Some(text) => {
                    if let Some(draft) =
                        PassageDraft::new(text, source, page_number, PassageKind::Text)
                    {
                        document.page_blocks.push(draft);
                    }
                }
                None => {
                    debug!("Page {} of {} has no text layer or OCR output", page_number, source);
                    document.stats.empty_pages += 1;
                }
            }

            for table in &page.tables {
                let units = self.table_units(table, source, page_number, &mut document.stats);
                document.table_units.extend(units);
            }
        }

        document
    }

    /// Picks the page text by coverage: OCR alone for near-empty text layers,
    /// both streams when each carries content, otherwise whichever exists.
    fn compose_page_text(&self, page: &PageContent, stats: &mut AssemblyStats) -> Option<String> {
        let native = page.native_text.trim();
        let ocr = page.ocr_text.trim();

        if native.chars().count() < self.scanned_page_threshold && !ocr.is_empty() {
            stats.ocr_only_pages += 1;
            return Some(ocr.to_string());
        }

        match (native.is_empty(), ocr.is_empty()) {
            (false, false) => {
                stats.merged_pages += 1;
                Some(format!("{}\n\n{}", native, ocr))
            }
            (false, true) => Some(native.to_string()),
            (true, false) => Some(ocr.to_string()),
            (true, true) => None,
        }
    }

    fn table_units(
        &self,
        csv_text: &str,
        source: &str,
        page_number: u32,
        stats: &mut AssemblyStats,
    ) -> Vec<PassageDraft> {
        match parse_table_rows(csv_text) {
            Ok(rows) if !rows.is_empty() => {
                stats.table_rows += rows.len();
                rows.into_iter()
                    .filter_map(|row| PassageDraft::new(row, source, page_number, PassageKind::TableRow))
                    .collect()
            }
            Ok(_) => {
                debug!("Table on page {} has no rows, keeping it verbatim", page_number);
                stats.verbatim_tables += 1;
                PassageDraft::new(csv_text.trim(), source, page_number, PassageKind::Table)
                    .into_iter()
                    .collect()
            }
            Err(e) => {
                warn!(
                    "Table on page {} of {} could not be parsed ({}), keeping it verbatim",
                    page_number, source, e
                );
                stats.verbatim_tables += 1;
                PassageDraft::new(csv_text.trim(), source, page_number, PassageKind::Table)
                    .into_iter()
                    .collect()
            }
        }
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Parses a CSV rendering and returns each non-blank record, header line
/// included, as its cell values joined in order. Detected tables carry no
/// synthetic header, so the first record is the table's own first row and is
/// citable like any other.
pub fn parse_table_rows(csv_text: &str) -> std::result::Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(csv_text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = record
            .iter()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(TABLE_CELL_DELIMITER);
        rows.push(row);
    }

    Ok(rows)
}
