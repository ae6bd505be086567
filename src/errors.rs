/*!
 * Error types for the erbify application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Per-file errors know
 * whether they are worth another attempt (`is_retryable`).
 */

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from the API
        message: String,
        /// Value of the Retry-After header, when the API sent one
        retry_after_secs: Option<u64>,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the same request could succeed if sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_)
            | Self::ParseError(_)
            | Self::ConnectionError(_)
            | Self::RateLimitExceeded { .. } => true,
            Self::ApiError { status_code, .. } => {
                *status_code >= 500 || *status_code == 408 || *status_code == 429
            }
            Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The service answered, but nothing was left after cleanup
    #[error("Translation service returned an empty response")]
    EmptyResponse,
}

impl TranslationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::EmptyResponse => true,
        }
    }
}

/// Errors raised while converting a single file
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove original {path:?}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The derived output path is already taken and overwriting is disabled
    #[error("Output file already exists: {0:?} (use --force to overwrite)")]
    OutputExists(PathBuf),

    #[error("Cannot derive an output path from {0:?}")]
    InvalidPath(PathBuf),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// Background I/O task could not be joined
    #[error("I/O task failed: {0}")]
    Task(String),
}

impl ConversionError {
    /// Whether another attempt at the same file could succeed.
    ///
    /// Missing inputs, permission problems, non-UTF-8 sources, existing outputs
    /// and authentication failures stay broken no matter how often we retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } | Self::Remove { source, .. } => {
                io_error_is_retryable(source)
            }
            Self::OutputExists(_) | Self::InvalidPath(_) => false,
            Self::Translation(e) => e.is_retryable(),
            Self::Task(_) => true,
        }
    }
}

fn io_error_is_retryable(error: &io::Error) -> bool {
    !matches!(
        error.kind(),
        io::ErrorKind::NotFound
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::InvalidData
            | io::ErrorKind::AlreadyExists
    )
}

/// Main application error type, fatal for the whole run
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or missing configuration, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// The provider client could not be set up
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
