/*!
 * Progress tracking and reporting for a conversion run.
 *
 * `ProgressCounters` is the only state shared between lanes; all updates are
 * atomic. `ProgressReporter` turns events into log lines and, when attached,
 * advances an indicatif progress bar. Neither affects control flow.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Aggregate counters shared by every lane of a run
#[derive(Debug, Default)]
pub struct ProgressCounters {
    /// Files that ended in a success outcome, including skipped ones
    succeeded: AtomicUsize,
    /// Empty sources left in place without a service call
    skipped: AtomicUsize,
    /// Files that used up their retry budget
    failed: AtomicUsize,
    /// Extra attempts made after a failed one
    retries: AtomicUsize,
}

/// Point-in-time copy of `ProgressCounters`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub retries: usize,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a success and return the new success total
    pub fn record_success(&self) -> usize {
        self.succeeded.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record a skipped empty source, which also counts as a success
    pub fn record_skip(&self) -> usize {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.record_success()
    }

    pub fn record_failure(&self) -> usize {
        self.failed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::SeqCst);
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            succeeded: self.succeeded.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            retries: self.retries.load(Ordering::SeqCst),
        }
    }
}

/// Final result of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of files handed to the scheduler
    pub total: usize,
    /// Counter values once every lane finished
    pub counts: ProgressSnapshot,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Files converted and written, skips excluded
    pub fn converted(&self) -> usize {
        self.counts.succeeded - self.counts.skipped
    }
}

/// Emits human-readable status lines for a run
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("hidden", &self.bar.is_hidden())
            .finish()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::hidden()
    }
}

impl ProgressReporter {
    /// Reporter that only logs
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Reporter that also draws a progress bar on stderr
    pub fn with_progress_bar(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(200));
        Self { bar }
    }

    // Log lines are printed with the bar suspended so they don't tear it.

    pub fn run_started(&self, total: usize, lanes: usize) {
        self.bar
            .suspend(|| info!("Found {} files. Starting conversion on {} lanes...", total, lanes));
    }

    pub fn task_started(&self, lane: usize, position: usize, total: usize, path: &Path) {
        self.bar
            .suspend(|| info!("[Lane {}] Processing {}/{}: {}", lane + 1, position, total, path.display()));
    }

    pub fn attempt_failed(&self, lane: usize, path: &Path, attempt: u32, max_attempts: u32, reason: &str) {
        self.bar.suspend(|| {
            warn!(
                "[Lane {}] Attempt {}/{} failed for {}: {}",
                lane + 1,
                attempt,
                max_attempts,
                path.display(),
                reason
            )
        });
    }

    pub fn retrying(&self, lane: usize, retry: u32, max_retries: u32) {
        self.bar
            .suspend(|| info!("[Lane {}] Trying again: {} / {}", lane + 1, retry, max_retries));
    }

    pub fn converted(&self, source: &Path, output: &Path, succeeded: usize) {
        self.bar.inc(1);
        self.bar.suspend(|| {
            info!(
                "Converted to: {} (from {}, {} done)",
                output.display(),
                source.display(),
                succeeded
            )
        });
    }

    pub fn skipped(&self, source: &Path) {
        self.bar.inc(1);
        self.bar
            .suspend(|| warn!("Skipping empty file: {}", source.display()));
    }

    pub fn failed(&self, source: &Path, attempts: u32, reason: &str) {
        self.bar.inc(1);
        self.bar.suspend(|| {
            error!(
                "Failed to convert {} after {} attempt(s): {}",
                source.display(),
                attempts,
                reason
            )
        });
    }

    pub fn run_finished(&self, summary: &BatchSummary) {
        self.bar.finish_and_clear();
        info!(
            "All operations complete: {} converted, {} skipped, {} failed of {} files ({} retries) in {:.1}s",
            summary.converted(),
            summary.counts.skipped,
            summary.counts.failed,
            summary.total,
            summary.counts.retries,
            summary.elapsed.as_secs_f64()
        );
    }
}
