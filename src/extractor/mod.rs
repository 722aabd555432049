// file: src/extractor/mod.rs
// description: pdf page, ocr and table extraction module exports
// reference: internal module structure

pub mod ocr;
pub mod page;
pub mod tables;

pub use ocr::{OcrEngine, TesseractOcr};
pub use page::{DocumentExtractor, PageContent, PdfPageExtractor};
pub use tables::{LayoutTableDetector, TableDetector};
