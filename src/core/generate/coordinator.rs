//! Feed generator - main orchestrator for a generation run
//!
//! Counts the eligible catalog, pages through it, turns every product into a
//! feed item and streams the document to the output file. Per-product
//! failures are counted and skipped; store and sink failures abort the run.

use crate::adapters::store::{create_product_store, ProductStore};
use crate::config::{FeedConfig, RegionalConfig};
use crate::core::assemble::{AssemblyOptions, RecordAssembler};
use crate::core::feed::writer::{render_item, FeedHeader, FeedWriter};
use crate::core::generate::pages::{PageCursor, RunPhase};
use crate::core::generate::summary::GenerationSummary;
use crate::domain::errors::{FeedError, RecordError};
use crate::domain::mapping::FieldMappingSpec;
use crate::domain::product::RawProductRecord;
use crate::domain::Result;
use crate::{log_page_progress, log_record_skipped};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::BufWriter;

/// Run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Feed document path
    pub output_path: PathBuf,

    /// Products per page
    pub page_size: u64,

    /// Hard cap on processed products
    pub limit: Option<u64>,

    /// Pause between pages
    pub pause: Option<Duration>,

    /// Record assembly tunables
    pub assembly: AssemblyOptions,

    /// Permission bits applied to the finished feed
    pub file_mode: Option<u32>,

    /// Detail log file reported in the summary
    pub log_file: Option<PathBuf>,
}

impl GenerationOptions {
    /// Derive run parameters from the configuration
    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            output_path: PathBuf::from(&config.feed.output_file),
            page_size: config.feed.products_per_page,
            limit: config.record_limit(),
            pause: config.page_pause(),
            assembly: AssemblyOptions {
                additional_image_limit: config.feed.additional_image_limit,
                description_max_length: config.feed.description_max_length,
            },
            file_mode: config.feed.parsed_file_mode(),
            log_file: config.log_file_path(),
        }
    }
}

/// Feed generator
pub struct FeedGenerator {
    store: Arc<dyn ProductStore + Send + Sync>,
    mapping: Arc<FieldMappingSpec>,
    header: FeedHeader,
    regional: RegionalConfig,
    options: GenerationOptions,
}

impl FeedGenerator {
    /// Create a generator connected to the configured database
    ///
    /// # Errors
    ///
    /// Returns a store connection error if the database cannot be reached.
    pub async fn new(config: &FeedConfig, mapping: FieldMappingSpec) -> Result<Self> {
        let store = create_product_store(&config.database).await?;
        Ok(Self::with_store(store, config, mapping))
    }

    /// Create a generator over an existing store
    pub fn with_store(
        store: Arc<dyn ProductStore + Send + Sync>,
        config: &FeedConfig,
        mapping: FieldMappingSpec,
    ) -> Self {
        Self {
            store,
            mapping: Arc::new(mapping),
            header: FeedHeader::from(&config.store),
            regional: config.regional.clone(),
            options: GenerationOptions::from_config(config),
        }
    }

    /// Replace the run parameters
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Current run parameters
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Execute the generation run
    ///
    /// The store is closed exactly once whatever the outcome. Fatal errors
    /// end the run in [`RunPhase::Failed`] with the reason recorded in the
    /// summary; a partially written feed is left in place.
    pub async fn execute(&self) -> GenerationSummary {
        let start_time = Instant::now();
        let mut summary = GenerationSummary::new(&self.options.output_path)
            .with_log_file(self.options.log_file.clone());
        let mut phase = RunPhase::Counting;

        tracing::info!(
            output = %self.options.output_path.display(),
            page_size = self.options.page_size,
            limit = ?self.options.limit,
            fields = self.mapping.len(),
            "Starting feed generation"
        );

        let outcome = self.run(&mut summary, &mut phase).await;

        if let Err(e) = self.store.close().await {
            tracing::warn!(error = %e, "Failed to close product store");
        }

        match outcome {
            Ok(()) => {
                phase.advance(RunPhase::Done);
                if summary.output_created {
                    if let Some(mode) = self.options.file_mode {
                        apply_file_mode(&self.options.output_path, mode).await;
                    }
                }
            }
            Err(e) => {
                phase.advance(RunPhase::Failed);
                tracing::error!(error = %e, processed = summary.processed, "Feed generation failed");
                summary.fail(e.to_string());
            }
        }

        summary.phase = phase;
        summary.duration = start_time.elapsed();
        summary.log_summary();
        summary
    }

    async fn run(&self, summary: &mut GenerationSummary, phase: &mut RunPhase) -> Result<()> {
        let eligible = self.store.count_eligible().await?;
        let total = match self.options.limit {
            Some(limit) => eligible.min(limit),
            None => eligible,
        };
        summary.total = total;

        if total == 0 {
            tracing::warn!("No products found to process");
            return Ok(());
        }
        tracing::info!(total, eligible, "Found products to process");

        phase.advance(RunPhase::Paging);
        let mut writer = open_feed(&self.options.output_path).await?;
        summary.output_created = true;
        writer.write_header(&self.header).await?;

        if let Err(e) = self.write_pages(&mut writer, summary, phase, total).await {
            // Keep what was already written; the footer stays missing
            if let Err(flush_err) = writer.flush().await {
                tracing::warn!(error = %flush_err, "Failed to flush partial feed");
            }
            return Err(e);
        }

        phase.advance(RunPhase::Finalizing);
        writer.write_footer().await?;
        Ok(())
    }

    async fn write_pages(
        &self,
        writer: &mut FeedWriter<BufWriter<File>>,
        summary: &mut GenerationSummary,
        phase: &mut RunPhase,
        total: u64,
    ) -> Result<()> {
        let assembler = RecordAssembler::new(
            self.store.clone(),
            self.mapping.clone(),
            self.options.assembly,
        );
        let mut cursor = PageCursor::new(
            self.store.clone(),
            self.options.page_size,
            total,
            self.options.limit,
        );

        loop {
            phase.advance(RunPhase::Fetching);
            let Some(page) = cursor.next_page().await? else {
                break;
            };

            phase.advance(RunPhase::Processing);
            for raw in &page.records {
                match self.process(&assembler, raw).await {
                    Ok(item) => {
                        writer.write_item(&item).await?;
                        summary.record_written();
                    }
                    Err(e) => {
                        log_record_skipped!(&e);
                        summary.record_skipped(e);
                    }
                }
            }
            summary.pages = cursor.pages();
            log_page_progress!(page.number + 1, summary.processed, total);

            if let Some(pause) = self.options.pause {
                if cursor.has_more() {
                    phase.advance(RunPhase::Paused);
                    tracing::info!(seconds = pause.as_secs_f64(), "Pausing to reduce server load");
                    tokio::time::sleep(pause).await;
                }
            }
        }
        Ok(())
    }

    async fn process(
        &self,
        assembler: &RecordAssembler,
        raw: &RawProductRecord,
    ) -> std::result::Result<String, RecordError> {
        let flat = assembler.assemble(raw).await?;
        render_item(&self.mapping, &flat, &self.regional)
    }
}

async fn open_feed(path: &Path) -> Result<FeedWriter<BufWriter<File>>> {
    let file = File::create(path).await.map_err(|e| {
        FeedError::Sink(format!("failed to create {}: {e}", path.display()))
    })?;
    Ok(FeedWriter::new(BufWriter::new(file)))
}

#[cfg(unix)]
async fn apply_file_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    match tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await {
        Ok(()) => tracing::info!(path = %path.display(), mode = format!("{mode:o}"), "Feed permissions set"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not set feed permissions"),
    }
}

#[cfg(not(unix))]
async fn apply_file_mode(path: &Path, mode: u32) {
    tracing::warn!(
        path = %path.display(),
        mode = format!("{mode:o}"),
        "File modes are not supported on this platform"
    );
}
