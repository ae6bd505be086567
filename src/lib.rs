/*!
 * # erbify - batch template conversion to ERB with AI
 *
 * A Rust library that converts Rails view templates (HAML by default) into
 * ERB by sending each file to a generative text service and replacing the
 * original with the answer.
 *
 * ## Features
 *
 * - Google Gemini `generateContent` provider
 * - Fixed number of concurrent lanes, each converting its files in order
 * - Bounded per-file retries with transient/terminal error classification
 * - Fence-marker cleanup of service answers
 * - Atomic output writes (temp file, fsync, rename) before the original is removed
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Prompting, the `Translator` seam and response cleanup
 * - `conversion`: Single-file conversion and the retry wrapper
 * - `scheduler`: Lane partitioning and concurrent execution
 * - `progress`: Shared counters and status reporting
 * - `file_utils`: Output path derivation and atomic writes
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod conversion;
pub mod errors;
pub mod file_utils;
pub mod progress;
pub mod providers;
pub mod scheduler;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, RetryPolicy};
pub use app_controller::Controller;
pub use conversion::{ConversionOutcome, ConversionTask, FileConverter, RetryState, RetryingConverter};
pub use errors::{AppError, ConversionError, ProviderError, TranslationError};
pub use progress::{BatchSummary, ProgressCounters, ProgressReporter};
pub use scheduler::{BatchPlan, BatchScheduler};
pub use translation::{ResponseSanitizer, TranslationService, Translator};
