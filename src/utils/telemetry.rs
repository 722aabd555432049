// file: src/utils/telemetry.rs
// description: setup verification report and per-stage timing for ingestion and queries
// reference: https://docs.rs/tracing

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Ok,
    /// Usable, with reduced capability (e.g. scanned pages yield no text).
    Warning,
    Failed,
}

impl CheckState {
    fn marker(self) -> &'static str {
        match self {
            CheckState::Ok => "[ok]",
            CheckState::Warning => "[warn]",
            CheckState::Failed => "[fail]",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComponentCheck {
    pub state: CheckState,
    pub detail: String,
    pub elapsed: Duration,
}

impl ComponentCheck {
    pub fn ok(detail: impl Into<String>, started: Instant) -> Self {
        Self::at(CheckState::Ok, detail, started)
    }

    pub fn warning(detail: impl Into<String>, started: Instant) -> Self {
        Self::at(CheckState::Warning, detail, started)
    }

    pub fn failed(detail: impl Into<String>, started: Instant) -> Self {
        Self::at(CheckState::Failed, detail, started)
    }

    fn at(state: CheckState, detail: impl Into<String>, started: Instant) -> Self {
        Self {
            state,
            detail: detail.into(),
            elapsed: started.elapsed(),
        }
    }
}

/// Result of `verify`: one check per external dependency of ingest and ask.
#[derive(Debug, Clone)]
pub struct SetupReport {
    pub pdfium: ComponentCheck,
    pub tesseract: ComponentCheck,
    pub vector_index: ComponentCheck,
    pub embedding: ComponentCheck,
    pub generator: ComponentCheck,
    pub checked_at: DateTime<Utc>,
}

impl SetupReport {
    pub fn components(&self) -> [(&'static str, &ComponentCheck); 5] {
        [
            ("PDF renderer (pdfium)", &self.pdfium),
            ("OCR engine (tesseract)", &self.tesseract),
            ("Vector index", &self.vector_index),
            ("Embedding model", &self.embedding),
            ("Answer model", &self.generator),
        ]
    }

    /// Ready when nothing failed; warnings only reduce capability.
    pub fn is_ready(&self) -> bool {
        self.components()
            .iter()
            .all(|(_, check)| check.state != CheckState::Failed)
    }

    pub fn passed(&self) -> usize {
        self.components()
            .iter()
            .filter(|(_, check)| check.state == CheckState::Ok)
            .count()
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(60);
        let mut out = format!(
            "{}\npdf_qa {} setup check ({})\n{}\n",
            rule,
            env!("CARGO_PKG_VERSION"),
            self.checked_at.format("%Y-%m-%d %H:%M:%S UTC"),
            rule
        );

        let components = self.components();
        for (name, check) in &components {
            let _ = writeln!(
                out,
                "{:<7} {:<24} {} ({} ms)",
                check.state.marker(),
                name,
                check.detail,
                check.elapsed.as_millis()
            );
        }

        let _ = write!(
            out,
            "{}\n{}/{} checks passed",
            rule,
            self.passed(),
            components.len()
        );
        out
    }
}

/// Splits one ingest or query into named stages and logs them as a single line.
pub struct StageTimer {
    operation: &'static str,
    started: Instant,
    mark: Instant,
    stages: Vec<(&'static str, Duration)>,
}

impl StageTimer {
    pub fn start(operation: &'static str) -> Self {
        let now = Instant::now();
        Self {
            operation,
            started: now,
            mark: now,
            stages: Vec::new(),
        }
    }

    /// Closes the stage running since the previous mark.
    pub fn stage(&mut self, name: &'static str) {
        let now = Instant::now();
        self.stages.push((name, now - self.mark));
        self.mark = now;
    }

    pub fn stages(&self) -> &[(&'static str, Duration)] {
        &self.stages
    }

    pub fn finish(self, slow_after: Duration) -> Duration {
        let total = self.started.elapsed();
        let breakdown = self
            .stages
            .iter()
            .map(|(name, d)| format!("{}={}ms", name, d.as_millis()))
            .collect::<Vec<_>>()
            .join(" ");

        if total > slow_after {
            warn!(
                operation = self.operation,
                total_ms = total.as_millis() as u64,
                "Slow {}: {}",
                self.operation,
                breakdown
            );
        } else {
            info!(
                operation = self.operation,
                total_ms = total.as_millis() as u64,
                "{} finished: {}",
                self.operation,
                breakdown
            );
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(tesseract: ComponentCheck, generator: ComponentCheck) -> SetupReport {
        let now = Instant::now();
        SetupReport {
            pdfium: ComponentCheck::ok("bound", now),
            tesseract,
            vector_index: ComponentCheck::ok("3 passages at memory://", now),
            embedding: ComponentCheck::ok("384 dimensions", now),
            generator,
            checked_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_ocr_is_only_a_warning() {
        let now = Instant::now();
        let report = report(
            ComponentCheck::warning("OCR disabled", now),
            ComponentCheck::ok("reachable", now),
        );

        assert!(report.is_ready());
        assert_eq!(report.passed(), 4);
        assert!(report.render().ends_with("4/5 checks passed"));
    }

    #[test]
    fn test_failed_generator_blocks_readiness() {
        let now = Instant::now();
        let report = report(
            ComponentCheck::ok("tesseract 5.3.0", now),
            ComponentCheck::failed("connection refused", now),
        );

        assert!(!report.is_ready());
        let rendered = report.render();
        assert!(rendered.contains("[fail]  Answer model"));
        assert!(rendered.contains("connection refused"));
    }

    #[test]
    fn test_stage_timer_records_stages_in_order() {
        let mut timer = StageTimer::start("ask");
        std::thread::sleep(Duration::from_millis(5));
        timer.stage("retrieve");
        timer.stage("generate");

        let names: Vec<_> = timer.stages().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["retrieve", "generate"]);
        assert!(timer.stages()[0].1 >= Duration::from_millis(5));
        assert!(timer.finish(Duration::from_secs(60)) >= Duration::from_millis(5));
    }
}
