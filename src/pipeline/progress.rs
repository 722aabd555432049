// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for document ingestion
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub pages_extracted: usize,
    pub ocr_only_pages: usize,
    pub ocr_failures: usize,
    pub table_failures: usize,
    pub tables_found: usize,
    pub passages_created: usize,
    pub duration_secs: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.pages_extracted as f64 / self.duration_secs as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.documents_processed + self.documents_failed;
        if total == 0 {
            return 0.0;
        }
        (self.documents_processed as f64 / total as f64) * 100.0
    }

    /// Pages or tables that fell back to a degraded result.
    pub fn degradations(&self) -> usize {
        self.ocr_failures + self.table_failures
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    documents_processed: AtomicUsize,
    documents_failed: AtomicUsize,
    pages_extracted: AtomicUsize,
    ocr_only_pages: AtomicUsize,
    ocr_failures: AtomicUsize,
    table_failures: AtomicUsize,
    tables_found: AtomicUsize,
    passages_created: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::with_color(true)
    }

    pub fn with_color(colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        let main_bar = create_progress_bar(&multi_progress, colored);
        let detail_bar = create_detail_bar(&multi_progress);
        Self::from_bars(main_bar, detail_bar)
    }

    /// Counts without drawing anything.
    pub fn hidden() -> Self {
        let multi_progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let main_bar = create_progress_bar(&multi_progress, false);
        let detail_bar = create_detail_bar(&multi_progress);
        Self::from_bars(main_bar, detail_bar)
    }

    fn from_bars(main_bar: ProgressBar, detail_bar: ProgressBar) -> Self {
        Self {
            main_bar,
            detail_bar,
            documents_processed: AtomicUsize::new(0),
            documents_failed: AtomicUsize::new(0),
            pages_extracted: AtomicUsize::new(0),
            ocr_only_pages: AtomicUsize::new(0),
            ocr_failures: AtomicUsize::new(0),
            table_failures: AtomicUsize::new(0),
            tables_found: AtomicUsize::new(0),
            passages_created: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// Extends the page bar by the page count of the document being opened.
    pub fn start_document(&self, name: &str, pages: usize) {
        self.main_bar.inc_length(pages as u64);
        self.main_bar.set_message(name.to_string());
    }

    pub fn inc_page(&self) {
        self.pages_extracted.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn add_ocr_only_pages(&self, count: usize) {
        self.ocr_only_pages.fetch_add(count, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn inc_ocr_failure(&self) {
        self.ocr_failures.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn inc_table_failure(&self) {
        self.table_failures.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn add_tables(&self, count: usize) {
        self.tables_found.fetch_add(count, Ordering::SeqCst);
    }

    pub fn add_passages(&self, count: usize) {
        self.passages_created.fetch_add(count, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn inc_documents_processed(&self) {
        self.documents_processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn inc_documents_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::SeqCst);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.detail_bar.set_message(message);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Ingestion complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> IngestStats {
        IngestStats {
            documents_processed: self.documents_processed.load(Ordering::SeqCst),
            documents_failed: self.documents_failed.load(Ordering::SeqCst),
            pages_extracted: self.pages_extracted.load(Ordering::SeqCst),
            ocr_only_pages: self.ocr_only_pages.load(Ordering::SeqCst),
            ocr_failures: self.ocr_failures.load(Ordering::SeqCst),
            table_failures: self.table_failures.load(Ordering::SeqCst),
            tables_found: self.tables_found.load(Ordering::SeqCst),
            passages_created: self.passages_created.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let passages = self.passages_created.load(Ordering::SeqCst);
        let ocr_only = self.ocr_only_pages.load(Ordering::SeqCst);
        let ocr = self.ocr_failures.load(Ordering::SeqCst);
        let tables = self.table_failures.load(Ordering::SeqCst);
        let failed = self.documents_failed.load(Ordering::SeqCst);

        let message = format!(
            "Passages: {} | OCR-only pages: {} | OCR fallbacks: {} | Table fallbacks: {} | Failed docs: {}",
            passages, ocr_only, ocr, tables, failed
        );

        self.detail_bar.set_message(message);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::hidden()
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({eta}) {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} pages ({eta}) {msg}"
    };
    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(if colored { "█▓▒░" } else { "=>-" });
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_stats_calculations() {
        let mut stats = IngestStats::new();
        stats.documents_processed = 9;
        stats.documents_failed = 1;
        stats.pages_extracted = 100;
        stats.duration_secs = 10;
        stats.ocr_failures = 2;
        stats.table_failures = 1;

        assert_eq!(stats.pages_per_second(), 10.0);
        assert!((stats.success_rate() - 90.0).abs() < 0.01);
        assert_eq!(stats.degradations(), 3);
    }

    #[test]
    fn test_ingest_stats_zero_duration() {
        let stats = IngestStats::new();
        assert_eq!(stats.pages_per_second(), 0.0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_progress_tracker_counts_pages() {
        let tracker = ProgressTracker::hidden();
        tracker.start_document("report.pdf", 3);
        tracker.inc_page();
        tracker.inc_page();
        tracker.inc_ocr_failure();
        tracker.add_passages(7);

        let stats = tracker.get_stats();
        assert_eq!(stats.pages_extracted, 2);
        assert_eq!(stats.ocr_failures, 1);
        assert_eq!(stats.passages_created, 7);
    }

    #[test]
    fn test_progress_tracker_document_outcomes() {
        let tracker = ProgressTracker::hidden();
        tracker.inc_documents_processed();
        tracker.inc_documents_failed();
        tracker.inc_documents_failed();

        let stats = tracker.get_stats();
        assert_eq!(stats.documents_processed, 1);
        assert_eq!(stats.documents_failed, 2);
    }
}
