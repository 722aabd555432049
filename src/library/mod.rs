// file: src/library/mod.rs
// description: document library discovery module exports
// reference: internal module structure

pub mod scanner;

pub use scanner::{PdfScanner, ScannedPdf};
