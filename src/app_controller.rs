use log::{debug, info};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::Config;
use crate::conversion::{FileConverter, RetryingConverter};
use crate::errors::AppError;
use crate::progress::{BatchSummary, ProgressCounters, ProgressReporter};
use crate::providers::gemini::Gemini;
use crate::scheduler::BatchScheduler;
use crate::translation::{TranslationService, Translator};

// @module: Application controller for batch template conversion

/// Main application controller: wires config, service and scheduler for one run
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller, rejecting invalid configuration up front
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert `files` through the configured Gemini model
    pub async fn run(&self, files: Vec<PathBuf>) -> Result<BatchSummary, AppError> {
        if files.is_empty() {
            info!("No .{} files given.", self.config.source_format);
            return Ok(self.empty_summary());
        }

        let gemini = Gemini::new(self.config.api_key.clone(), &self.config.gemini)?;
        debug!(
            "Using Gemini model {} on {} lanes, {} attempts per file (retry policy: {})",
            gemini.model(),
            self.config.batch.lane_count,
            self.config.batch.max_attempts,
            self.config.batch.retry_policy
        );

        let reporter = if std::io::stderr().is_terminal() {
            ProgressReporter::with_progress_bar(files.len())
        } else {
            ProgressReporter::hidden()
        };

        let translator: Arc<dyn Translator> = Arc::new(TranslationService::new(gemini));
        Ok(self.run_with_translator(files, translator, reporter).await)
    }

    /// Convert `files` with an explicit translator and reporter
    pub async fn run_with_translator(
        &self,
        files: Vec<PathBuf>,
        translator: Arc<dyn Translator>,
        reporter: ProgressReporter,
    ) -> BatchSummary {
        let scheduler = self.build_scheduler(translator, reporter);
        scheduler.run(&files).await
    }

    fn build_scheduler(&self, translator: Arc<dyn Translator>, reporter: ProgressReporter) -> BatchScheduler {
        let batch = &self.config.batch;
        let counters = Arc::new(ProgressCounters::new());

        let converter = FileConverter::new(translator, counters, reporter)
            .force_overwrite(batch.force_overwrite);
        let retrying = RetryingConverter::new(converter)
            .max_attempts(batch.max_attempts)
            .policy(batch.retry_policy)
            .backoff_ms(batch.retry_backoff_ms);

        BatchScheduler::new(Arc::new(retrying), self.config.source_format.clone())
            .lane_count(batch.lane_count)
    }

    fn empty_summary(&self) -> BatchSummary {
        BatchSummary {
            total: 0,
            counts: Default::default(),
            elapsed: Default::default(),
        }
    }
}
