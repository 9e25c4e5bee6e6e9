//! Generation summary and reporting

use crate::core::generate::pages::RunPhase;
use crate::domain::errors::RecordError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// Skipped products kept in detail; the rest are only counted
pub const SKIPPED_SAMPLE_LIMIT: usize = 10;

/// Summary of a generation run
///
/// Reported whether the run completed or was aborted after partial progress.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    /// Eligible products, capped by the record limit
    pub total: u64,

    /// Products attempted (written or skipped)
    pub processed: u64,

    /// Products written to the feed
    pub written: u64,

    /// Products skipped because of a per-record failure
    pub skipped: u64,

    /// Detail of the first [`SKIPPED_SAMPLE_LIMIT`] skipped products
    pub skipped_records: Vec<RecordError>,

    /// Pages fetched
    pub pages: u64,

    /// Duration of the run
    pub duration: Duration,

    /// Feed document path
    pub output_path: PathBuf,

    /// Whether the feed document was created
    pub output_created: bool,

    /// Detail log file, when file logging is on
    pub log_file: Option<PathBuf>,

    /// Phase the run ended in
    pub phase: RunPhase,

    /// Reason the run was aborted
    pub failure: Option<String>,
}

impl GenerationSummary {
    /// Create an empty summary for a run writing to `output_path`
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            started_at: Utc::now(),
            total: 0,
            processed: 0,
            written: 0,
            skipped: 0,
            skipped_records: Vec::new(),
            pages: 0,
            duration: Duration::ZERO,
            output_path: output_path.into(),
            output_created: false,
            log_file: None,
            phase: RunPhase::Counting,
            failure: None,
        }
    }

    /// Set the log file pointer
    pub fn with_log_file(mut self, log_file: Option<PathBuf>) -> Self {
        self.log_file = log_file;
        self
    }

    /// Count a written product
    pub fn record_written(&mut self) {
        self.processed += 1;
        self.written += 1;
    }

    /// Count a skipped product
    pub fn record_skipped(&mut self, error: RecordError) {
        self.processed += 1;
        self.skipped += 1;
        if self.skipped_records.len() < SKIPPED_SAMPLE_LIMIT {
            self.skipped_records.push(error);
        }
    }

    /// Mark the run as aborted
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.phase = RunPhase::Failed;
        self.failure = Some(reason.into());
    }

    /// Whether the run finished without a fatal error
    ///
    /// Skipped products do not make a run unsuccessful.
    pub fn is_successful(&self) -> bool {
        self.failure.is_none()
    }

    /// Share of processed products that were skipped, as a percentage
    pub fn skip_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        (self.skipped as f64 / self.processed as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        crate::log_generation_complete!(self.written, self.skipped, self.duration);
        tracing::info!(
            total = self.total,
            processed = self.processed,
            pages = self.pages,
            skip_rate = format!("{:.2}%", self.skip_rate()),
            output = %self.output_path.display(),
            phase = %self.phase,
            "Generation summary"
        );

        if let Some(reason) = &self.failure {
            tracing::error!(reason = %reason, "Feed generation aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductId;

    #[test]
    fn test_new_summary_is_empty() {
        let summary = GenerationSummary::new("feed.xml");
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.skip_rate(), 0.0);
        assert!(summary.is_successful());
        assert!(!summary.output_created);
    }

    #[test]
    fn test_counters() {
        let mut summary = GenerationSummary::new("feed.xml");
        summary.record_written();
        summary.record_written();
        summary.record_written();
        summary.record_skipped(RecordError::assembly(ProductId::new(4), "boom"));

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.written, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.skip_rate(), 25.0);
        assert_eq!(summary.skipped_records[0].product_id, ProductId::new(4));
        assert!(summary.is_successful());
    }

    #[test]
    fn test_skipped_detail_is_capped() {
        let mut summary = GenerationSummary::new("feed.xml");
        for id in 1..=25 {
            summary.record_skipped(RecordError::assembly(ProductId::new(id), "boom"));
        }

        assert_eq!(summary.skipped, 25);
        assert_eq!(summary.processed, 25);
        assert_eq!(summary.skipped_records.len(), SKIPPED_SAMPLE_LIMIT);
        assert_eq!(summary.skipped_records[0].product_id, ProductId::new(1));
        assert_eq!(
            summary.skipped_records[SKIPPED_SAMPLE_LIMIT - 1].product_id,
            ProductId::new(SKIPPED_SAMPLE_LIMIT as u64)
        );
    }

    #[test]
    fn test_fail_marks_phase() {
        let mut summary = GenerationSummary::new("feed.xml");
        summary.fail("disk full");
        assert!(!summary.is_successful());
        assert_eq!(summary.phase, RunPhase::Failed);
        assert_eq!(summary.failure.as_deref(), Some("disk full"));
    }
}
