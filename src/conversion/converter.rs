use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::ConversionError;
use crate::file_utils::FileManager;
use crate::progress::{ProgressCounters, ProgressReporter};
use crate::translation::Translator;

use super::{ConversionOutcome, ConversionTask, RetryState};

/// Runs a single attempt at converting one file
pub struct FileConverter {
    /// Service turning source templates into ERB
    translator: Arc<dyn Translator>,
    /// Run-wide counters, bumped on success
    counters: Arc<ProgressCounters>,
    reporter: ProgressReporter,
    /// Replace outputs that already exist
    force_overwrite: bool,
}

impl FileConverter {
    pub fn new(
        translator: Arc<dyn Translator>,
        counters: Arc<ProgressCounters>,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            translator,
            counters,
            reporter,
            force_overwrite: false,
        }
    }

    pub fn force_overwrite(mut self, force_overwrite: bool) -> Self {
        self.force_overwrite = force_overwrite;
        self
    }

    pub fn counters(&self) -> &Arc<ProgressCounters> {
        &self.counters
    }

    pub fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// Convert one file; every error is folded into a `Failure` outcome.
    pub async fn convert(&self, task: &ConversionTask) -> ConversionOutcome {
        self.convert_attempt(task, &mut RetryState::new()).await
    }

    /// One attempt at `task`, resuming from what earlier attempts left in `state`.
    ///
    /// When a previous attempt wrote the output but failed to remove the
    /// original, only the removal is repeated.
    pub async fn convert_attempt(&self, task: &ConversionTask, state: &mut RetryState) -> ConversionOutcome {
        debug!("Processing: {}", task.path().display());

        match self.try_convert(task, state).await {
            Ok(Some(output_path)) => {
                let succeeded = self.counters.record_success();
                self.reporter.converted(task.path(), &output_path, succeeded);
                ConversionOutcome::Success {
                    output_path: Some(output_path),
                }
            }
            Ok(None) => {
                self.counters.record_skip();
                self.reporter.skipped(task.path());
                ConversionOutcome::Success { output_path: None }
            }
            Err(e) => {
                debug!("Attempt on {} failed: {}", task.path().display(), e);
                ConversionOutcome::Failure {
                    reason: e.to_string(),
                    retryable: e.is_retryable(),
                }
            }
        }
    }

    /// Returns the written path, or `None` for a blank source
    async fn try_convert(
        &self,
        task: &ConversionTask,
        state: &mut RetryState,
    ) -> Result<Option<PathBuf>, ConversionError> {
        if let Some(output_path) = state.written_output().map(Path::to_path_buf) {
            if FileManager::file_exists(&output_path) {
                debug!("Output {} already written, removing original only", output_path.display());
                self.remove_original(task).await?;
                return Ok(Some(output_path));
            }
            state.set_written_output(None);
        }

        let source = tokio::fs::read_to_string(task.path())
            .await
            .map_err(|source| ConversionError::Read {
                path: task.path().to_path_buf(),
                source,
            })?;

        if source.trim().is_empty() {
            return Ok(None);
        }

        let output_path = FileManager::generate_output_path(task.path(), task.source_format())
            .filter(|output| output.as_path() != task.path())
            .ok_or_else(|| ConversionError::InvalidPath(task.path().to_path_buf()))?;

        // Cheap early exit; the no-clobber rename below is the real guard.
        if !self.force_overwrite && FileManager::file_exists(&output_path) {
            return Err(ConversionError::OutputExists(output_path));
        }

        let translated = self.translator.translate(&source, task.source_format()).await?;

        self.write_output(&output_path, translated).await?;
        state.set_written_output(Some(output_path.clone()));

        self.remove_original(task).await?;

        Ok(Some(output_path))
    }

    async fn remove_original(&self, task: &ConversionTask) -> Result<(), ConversionError> {
        match tokio::fs::remove_file(task.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Original already gone: {}", task.path().display());
                Ok(())
            }
            Err(source) => Err(ConversionError::Remove {
                path: task.path().to_path_buf(),
                source,
            }),
        }
    }

    async fn write_output(&self, output_path: &Path, content: String) -> Result<(), ConversionError> {
        let path = output_path.to_path_buf();
        let overwrite = self.force_overwrite;

        tokio::task::spawn_blocking(move || FileManager::write_atomic(&path, &content, overwrite))
            .await
            .map_err(|e| ConversionError::Task(e.to_string()))?
            .map_err(|source| {
                if source.kind() == io::ErrorKind::AlreadyExists {
                    ConversionError::OutputExists(output_path.to_path_buf())
                } else {
                    ConversionError::Write {
                        path: output_path.to_path_buf(),
                        source,
                    }
                }
            })
    }
}
