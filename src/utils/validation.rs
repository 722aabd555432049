// file: src/utils/validation.rs
// description: input validation for documents, questions and endpoints
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::fs;
use std::path::Path;

const MAX_QUESTION_CHARS: usize = 4000;

pub struct Validator;

impl Validator {
    /// A missing path is `FileNotFound`; anything else wrong is a validation error.
    pub fn validate_pdf_path(path: &Path, max_file_size_mb: usize) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(PipelineError::Validation(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        Self::validate_pdf_extension(path)?;

        let metadata = fs::metadata(path).map_err(|e| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source: e,
        })?;
        let max_bytes = (max_file_size_mb as u64) * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::Validation(format!(
                "{} is {} bytes, above the {} MB limit",
                path.display(),
                metadata.len(),
                max_file_size_mb
            )));
        }

        Ok(())
    }

    pub fn validate_pdf_extension(path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Ok(()),
            _ => Err(PipelineError::Validation(format!(
                "File is not a PDF: {}",
                path.display()
            ))),
        }
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_question(question: &str) -> Result<()> {
        if question.trim().is_empty() {
            return Err(PipelineError::Validation("Question is empty".to_string()));
        }

        if question.chars().count() > MAX_QUESTION_CHARS {
            return Err(PipelineError::Validation(format!(
                "Question too long (max {} characters)",
                MAX_QUESTION_CHARS
            )));
        }

        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    /// Cuts on character boundaries, so Devanagari text never splits mid code point.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let head: String = text.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}
