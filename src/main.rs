// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use erbify::app_config::{self, Config, RetryPolicy};
use erbify::Controller;

/// CLI Wrapper for RetryPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliRetryPolicy {
    Transient,
    Always,
}

impl From<CliRetryPolicy> for RetryPolicy {
    fn from(cli_policy: CliRetryPolicy) -> Self {
        match cli_policy {
            CliRetryPolicy::Transient => RetryPolicy::Transient,
            CliRetryPolicy::Always => RetryPolicy::Always,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// erbify - convert Rails view templates to ERB with AI
///
/// Sends every file to Gemini, writes the ERB next to it and removes the original.
#[derive(Parser, Debug)]
#[command(name = "erbify")]
#[command(version)]
#[command(about = "AI-powered template conversion to ERB")]
#[command(long_about = "erbify sends each template file to Gemini for conversion to ERB, writes the
result next to the source (index.html.haml -> index.html.erb, header.haml -> header.html.erb)
and removes the original. Files are processed on 8 concurrent lanes by default.

EXAMPLES:
    erbify app/views/home/index.html.haml
    erbify $(find app/views -name '*.haml')
    FORMAT=slim erbify app/views/**/*.slim
    erbify --retry-policy always --max-attempts 6 app/views/**/*.haml

Every option can also be given through the environment variable shown in --help.")]
struct CommandLineOptions {
    /// Template files to convert
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Source dialect tag, used in the prompt and to derive output names
    #[arg(long, env = "FORMAT")]
    format: Option<String>,

    /// Gemini model name
    #[arg(short, long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Gemini API base URL
    #[arg(long, env = "GEMINI_ENDPOINT")]
    endpoint: Option<String>,

    /// Gemini thinking level ("low" or "high")
    #[arg(long, env = "GEMINI_THINKING_LEVEL")]
    thinking_level: Option<String>,

    /// Number of concurrent lanes
    #[arg(long, env = "ERBIFY_LANES")]
    lanes: Option<usize>,

    /// Attempts per file, including the first
    #[arg(long, env = "ERBIFY_MAX_ATTEMPTS")]
    max_attempts: Option<u32>,

    /// Which failures are retried
    #[arg(long, env = "ERBIFY_RETRY_POLICY", value_enum)]
    retry_policy: Option<CliRetryPolicy>,

    /// Base delay between attempts in milliseconds, doubled on each retry
    #[arg(long, env = "ERBIFY_RETRY_BACKOFF_MS")]
    retry_backoff_ms: Option<u64>,

    /// HTTP timeout in seconds, 0 disables it
    #[arg(long, env = "ERBIFY_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Overwrite output files that already exist
    #[arg(short, long, env = "ERBIFY_FORCE")]
    force: bool,

    /// Set logging level
    #[arg(short, long, env = "ERBIFY_LOG_LEVEL", value_enum)]
    log_level: Option<CliLogLevel>,

    /// Optional JSON configuration file, overridden by flags and environment
    #[arg(short, long, env = "ERBIFY_CONFIG")]
    config: Option<PathBuf>,
}

impl CommandLineOptions {
    /// Layer flags and environment over the config file (or defaults)
    fn into_config(self) -> Result<(Config, Vec<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }
        if let Some(format) = self.format {
            config.source_format = format;
        }
        if let Some(model) = self.model {
            config.gemini.model = model;
        }
        if let Some(endpoint) = self.endpoint {
            config.gemini.endpoint = endpoint;
        }
        if let Some(level) = self.thinking_level {
            config.gemini.thinking_level = Some(level).filter(|l| !l.is_empty());
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.gemini.timeout_secs = timeout_secs;
        }
        if let Some(lanes) = self.lanes {
            config.batch.lane_count = lanes;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.batch.max_attempts = max_attempts;
        }
        if let Some(policy) = self.retry_policy {
            config.batch.retry_policy = policy.into();
        }
        if let Some(backoff) = self.retry_backoff_ms {
            config.batch.retry_backoff_ms = backoff;
        }
        if self.force {
            config.batch.force_overwrite = true;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level.into();
        }

        Ok((config, self.files))
    }
}

// @struct: Custom logger implementation, filtered by `log::max_level`
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌"),
            Level::Warn => ("1;33", "⚠️ "),
            Level::Info => ("1;32", "  "),
            Level::Debug => ("1;36", "🔍"),
            Level::Trace => ("1;35", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::decoration(record.level());

            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration is known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    let (config, files) = cli.into_config()?;
    log::set_max_level(level_filter(&config.log_level));

    // Missing credentials end the process here, before any file is read
    let controller = Controller::with_config(config).context("Invalid configuration")?;

    controller.run(files).await?;

    // Per-file failures are reported in the log, not in the exit status
    Ok(())
}
