// file: src/library/scanner.rs
// description: pdf discovery under a file or directory with skip and size filtering
// reference: https://docs.rs/walkdir

use crate::config::IngestConfig;
use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct PdfScanner {
    skip_patterns: Vec<String>,
    max_file_size_mb: usize,
}

#[derive(Debug, Clone)]
pub struct ScannedPdf {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
}

impl PdfScanner {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            skip_patterns: config.skip_patterns.clone(),
            max_file_size_mb: config.max_file_size_mb,
        }
    }

    /// A single file is returned as is after validation; a directory is walked
    /// for `.pdf` files in path order.
    pub fn scan(&self, root: &Path) -> Result<Vec<ScannedPdf>> {
        if root.is_file() {
            Validator::validate_pdf_path(root, self.max_file_size_mb)?;
            let size = std::fs::metadata(root)
                .map_err(|e| PipelineError::FileOperation {
                    path: root.to_path_buf(),
                    source: e,
                })?
                .len();
            let relative_path = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            return Ok(vec![ScannedPdf {
                path: root.to_path_buf(),
                relative_path,
                size,
            }]);
        }

        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let max_size = (self.max_file_size_mb as u64) * 1024 * 1024;
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            if Validator::validate_pdf_extension(path).is_err() {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if metadata.len() > max_size {
                debug!(
                    "Skipping large file ({} MB): {}",
                    metadata.len() / 1024 / 1024,
                    path.display()
                );
                continue;
            }

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            files.push(ScannedPdf {
                path: path.to_path_buf(),
                relative_path,
                size: metadata.len(),
            });
        }

        info!("Found {} PDF files", files.len());
        Ok(files)
    }

    /// `*.ext` matches a suffix, `dir/*` a directory component, anything else a substring.
    pub fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");

        self.skip_patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                path_str.ends_with(suffix)
            } else if let Some(dir) = pattern.strip_suffix("/*") {
                path_str.starts_with(&format!("{}/", dir))
                    || path_str.contains(&format!("/{}/", dir))
            } else {
                path_str.contains(pattern.as_str())
            }
        })
    }
}
