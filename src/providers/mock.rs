/*!
 * Mock provider implementation for testing.
 *
 * This module provides a scripted provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with ERB output
 * - `MockProvider::fenced()` - Succeeds, wrapping the answer in markdown fences
 * - `MockProvider::fail_first(n)` - Fails the first `n` requests, then succeeds
 * - `MockProvider::failing()` - Always fails with a connection error
 * - `MockProvider::unauthorized()` - Always fails with an authentication error
 *
 * Clones share their counters, so a test can keep a handle while the
 * translation service owns the provider.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Answer produced by a working mock when no custom generator is set
pub const DEFAULT_MOCK_OUTPUT: &str = "<div class=\"converted\"><%= yield %></div>";

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The full prompt sent to the provider
    pub prompt: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The generated text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Succeeds, with the answer wrapped in ```erb fences
    Fenced,
    /// Fails the first `failures` requests with a connection error
    FailFirst { failures: usize },
    /// Always fails with a connection error
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
    /// Returns an empty answer
    Empty,
    /// Succeeds after sleeping, for concurrency tests
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of requests received so far
    request_count: Arc<AtomicUsize>,
    /// Requests currently being served
    in_flight: Arc<AtomicUsize>,
    /// Highest value `in_flight` ever reached
    max_in_flight: Arc<AtomicUsize>,
    /// Every prompt received, in arrival order
    prompts: Arc<Mutex<Vec<String>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    pub fn fail_first(failures: usize) -> Self {
        Self::new(MockBehavior::FailFirst { failures })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of requests that were served at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn answer(&self, request: &MockRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => DEFAULT_MOCK_OUTPUT.to_string(),
        }
    }

    async fn respond(&self, request: &MockRequest, count: usize) -> Result<MockResponse, ProviderError> {
        match self.behavior {
            MockBehavior::Working => Ok(MockResponse {
                text: self.answer(request),
            }),
            MockBehavior::Fenced => Ok(MockResponse {
                text: format!("```erb\n{}\n```\n", self.answer(request)),
            }),
            MockBehavior::FailFirst { failures } if count < failures => Err(
                ProviderError::ConnectionError(format!("Simulated failure {} of {}", count + 1, failures)),
            ),
            MockBehavior::FailFirst { .. } => Ok(MockResponse {
                text: self.answer(request),
            }),
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "API key not valid".to_string(),
            )),
            MockBehavior::Empty => Ok(MockResponse { text: String::new() }),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(MockResponse {
                    text: self.answer(request),
                })
            }
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: Arc::clone(&self.max_in_flight),
            prompts: Arc::clone(&self.prompts),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    fn build_request(&self, prompt: &str) -> MockRequest {
        MockRequest {
            prompt: prompt.to_string(),
        }
    }

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.prompt.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let result = self.respond(&request, count).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
