use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration: defaults, an optional
/// JSON file, and validation before any file is touched.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Credential for the translation service. Never written back out.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Dialect tag of the input templates, e.g. "haml"
    #[serde(default = "default_source_format")]
    pub source_format: String,

    /// Gemini service settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Scheduling and retry settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How the retrying converter treats a failed attempt
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetryPolicy {
    // @policy: Retry only failures classified as transient
    #[default]
    Transient,
    // @policy: Retry every failure until attempts run out
    Always,
}

impl std::fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Always => write!(f, "always"),
        }
    }
}

/// Gemini service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Model name (e.g., "gemini-3-pro-preview")
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL, without the `/models/...` suffix
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    /// Thinking level sent with every request ("low", "high"), if any
    #[serde(default = "default_thinking_level")]
    pub thinking_level: Option<String>,

    /// Temperature parameter for text generation
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Transport timeout in seconds, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            endpoint: default_gemini_endpoint(),
            thinking_level: default_thinking_level(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Batch scheduling configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Number of concurrent lanes, which is also the cap on in-flight requests
    #[serde(default = "default_lane_count")]
    pub lane_count: usize,

    /// Attempts per file, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Which failures are retried
    #[serde(default)]
    pub retry_policy: RetryPolicy,

    /// Base backoff between attempts in milliseconds, doubled on each retry.
    /// Zero retries immediately.
    #[serde(default)]
    pub retry_backoff_ms: u64,

    /// Replace output files that already exist
    #[serde(default)]
    pub force_overwrite: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            lane_count: default_lane_count(),
            max_attempts: default_max_attempts(),
            retry_policy: RetryPolicy::default(),
            retry_backoff_ms: 0,
            force_overwrite: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_format() -> String {
    "haml".to_string()
}

fn default_gemini_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_thinking_level() -> Option<String> {
    Some("low".to_string())
}

fn default_timeout_secs() -> u64 {
    300 // thinking models can take minutes on large templates
}

fn default_lane_count() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    4
}

impl Config {
    /// Load a configuration file; fields missing from the file keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AppError::Config(format!("Failed to open config file {:?}: {}", path, e))
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "Please set GOOGLE_API_KEY in the environment (or pass --api-key)".to_string(),
            ));
        }

        let format = self.source_format.trim();
        if format.is_empty() || format.contains(['.', '/', '\\']) {
            return Err(AppError::Config(format!(
                "Invalid source format tag: {:?}",
                self.source_format
            )));
        }

        Url::parse(&self.gemini.endpoint).map_err(|e| {
            AppError::Config(format!("Invalid Gemini endpoint {:?}: {}", self.gemini.endpoint, e))
        })?;

        if self.gemini.model.trim().is_empty() {
            return Err(AppError::Config("Gemini model name cannot be empty".to_string()));
        }

        if self.batch.lane_count == 0 {
            return Err(AppError::Config("Lane count must be at least 1".to_string()));
        }

        if self.batch.max_attempts == 0 {
            return Err(AppError::Config("Max attempts must be at least 1".to_string()));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: String::new(),
            source_format: default_source_format(),
            gemini: GeminiConfig::default(),
            batch: BatchConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
