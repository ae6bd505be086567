use std::time::Duration;

use crate::app_config::RetryPolicy;

use super::{ConversionOutcome, ConversionTask, FileConverter, RetryState};

impl RetryPolicy {
    /// Whether a failure with the given classification gets another attempt
    pub fn allows_retry(&self, retryable: bool) -> bool {
        match self {
            Self::Transient => retryable,
            Self::Always => true,
        }
    }
}

/// Wraps `FileConverter` with a bounded number of attempts per file
pub struct RetryingConverter {
    converter: FileConverter,
    /// Attempts per file, including the first
    max_attempts: u32,
    policy: RetryPolicy,
    /// Base delay between attempts, doubled on each retry; zero retries at once
    backoff_base_ms: u64,
}

impl RetryingConverter {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

    pub fn new(converter: FileConverter) -> Self {
        Self {
            converter,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            policy: RetryPolicy::default(),
            backoff_base_ms: 0,
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn backoff_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    pub fn converter(&self) -> &FileConverter {
        &self.converter
    }

    /// Convert `task`, retrying failed attempts the policy allows.
    ///
    /// Returns on the first success, otherwise the failure of the last attempt.
    pub async fn convert_with_retry(&self, task: &ConversionTask, lane: usize) -> ConversionOutcome {
        let reporter = self.converter.reporter();
        let counters = self.converter.counters();
        let mut state = RetryState::new();

        loop {
            let attempt = state.begin_attempt();
            let outcome = self.converter.convert_attempt(task, &mut state).await;
            if outcome.is_success() {
                return outcome;
            }

            let reason = outcome.reason().unwrap_or_default().to_string();
            reporter.attempt_failed(lane, task.path(), attempt, self.max_attempts, &reason);

            if attempt >= self.max_attempts || !self.policy.allows_retry(outcome.is_retryable()) {
                counters.record_failure();
                reporter.failed(task.path(), attempt, &reason);
                return outcome;
            }

            if self.backoff_base_ms > 0 {
                let backoff_ms = self
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(16));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }

            counters.record_retry();
            reporter.retrying(lane, attempt, self.max_attempts - 1);
        }
    }
}
