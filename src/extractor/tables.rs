// file: src/extractor/tables.rs
// description: column-aligned table detection over a page's text layer
// reference: https://docs.rs/csv

use crate::error::{PipelineError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref COLUMN_GAP: Regex = Regex::new(r"\s{2,}").expect("COLUMN_GAP regex is valid");
}

const MIN_TABLE_ROWS: usize = 2;
const MIN_TABLE_COLUMNS: usize = 2;

pub trait TableDetector: Send + Sync {
    /// Returns every table found on the page as CSV, in reading order.
    fn detect(&self, page_text: &str) -> Result<Vec<String>>;
}

/// Treats runs of consecutive lines that split into the same number of
/// cells as a table. Cells are separated by tabs, pipes, or two or more spaces.
#[derive(Debug, Clone, Default)]
pub struct LayoutTableDetector;

impl LayoutTableDetector {
    pub fn new() -> Self {
        Self
    }

    fn flush(run: &mut Vec<Vec<String>>, tables: &mut Vec<String>) -> Result<()> {
        if run.len() >= MIN_TABLE_ROWS {
            tables.push(to_csv(run)?);
        }
        run.clear();
        Ok(())
    }
}

impl TableDetector for LayoutTableDetector {
    fn detect(&self, page_text: &str) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        let mut run: Vec<Vec<String>> = Vec::new();

        for line in page_text.lines() {
            let cells = split_cells(line);
            if cells.len() < MIN_TABLE_COLUMNS {
                Self::flush(&mut run, &mut tables)?;
                continue;
            }

            if run.first().is_some_and(|first| first.len() != cells.len()) {
                Self::flush(&mut run, &mut tables)?;
            }
            run.push(cells);
        }
        Self::flush(&mut run, &mut tables)?;

        Ok(tables)
    }
}

pub fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let cells: Vec<&str> = if line.contains('\t') {
        line.split('\t').collect()
    } else if line.contains('|') {
        line.trim_matches('|').split('|').collect()
    } else {
        COLUMN_GAP.split(line).collect()
    };

    cells
        .into_iter()
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(String::from)
        .collect()
}

fn to_csv(rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| PipelineError::TableDetection(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::TableDetection(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PipelineError::TableDetection(e.to_string()))
}
