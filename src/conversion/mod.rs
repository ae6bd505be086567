/*!
 * Per-file conversion.
 *
 * - `converter`: one attempt at one file (read, translate, write, remove)
 * - `retry`: bounded retries around the converter
 */

use std::path::{Path, PathBuf};

pub use self::converter::FileConverter;
pub use self::retry::RetryingConverter;

pub mod converter;
pub mod retry;

/// Dialect every output file is written in
pub const TARGET_FORMAT: &str = "erb";

/// One template file to convert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    path: PathBuf,
    source_format: String,
}

impl ConversionTask {
    pub fn new(path: impl Into<PathBuf>, source_format: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_format: source_format.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Dialect tag of the source, e.g. "haml"
    pub fn source_format(&self) -> &str {
        &self.source_format
    }

    pub fn target_format(&self) -> &'static str {
        TARGET_FORMAT
    }
}

/// Attempt bookkeeping for one task, alive for the duration of its retries
#[derive(Debug, Default)]
pub struct RetryState {
    attempt: u32,
    /// Output an earlier attempt already wrote; the next attempt only has to
    /// remove the original
    written_output: Option<PathBuf>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts started so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn written_output(&self) -> Option<&Path> {
        self.written_output.as_deref()
    }

    pub(crate) fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    pub(crate) fn set_written_output(&mut self, output_path: Option<PathBuf>) {
        self.written_output = output_path;
    }
}

/// Result of one or more attempts at a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// `output_path` is `None` when the source was blank and left untouched
    Success { output_path: Option<PathBuf> },
    /// `retryable` tells whether another attempt could change the result
    Failure { reason: String, retryable: bool },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failure { retryable: true, .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            Self::Success { output_path } => output_path.as_deref(),
            Self::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }
}
