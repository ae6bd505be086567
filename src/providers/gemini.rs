use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::app_config::GeminiConfig;
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Gemini client for the `generateContent` endpoint
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    endpoint: String,
    /// Model used for every request
    model: String,
    /// Thinking level attached to requests built by this client
    thinking_level: Option<String>,
    /// Temperature attached to requests built by this client
    temperature: Option<f32>,
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("thinking_level", &self.thinking_level)
            .finish_non_exhaustive()
    }
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// Conversation turns, a single user turn for template conversion
    pub contents: Vec<GeminiContent>,

    /// Sampling and reasoning settings
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One conversation turn
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role of the message sender (user, model)
    #[serde(default)]
    pub role: String,

    /// Content parts of the turn
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A text part; non-text parts deserialize with `text: None`
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set on reasoning summaries, which are not part of the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(rename = "thinkingConfig", skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
pub struct ThinkingConfig {
    #[serde(rename = "thinkingLevel")]
    pub thinking_level: String,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,

    #[serde(rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,

    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<UsageMetadata>,

    /// Error object some proxies return with a 200 status
    pub error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,

    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromptFeedback {
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    pub prompt_token_count: Option<u32>,

    #[serde(rename = "candidatesTokenCount")]
    pub candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

impl GeminiRequest {
    /// Create a single-turn request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: Some(prompt.into()),
                    thought: None,
                }],
            }],
            generation_config: None,
        }
    }

    /// Set the thinking level
    pub fn thinking_level(mut self, level: impl Into<String>) -> Self {
        self.generation_config
            .get_or_insert_with(GenerationConfig::empty)
            .thinking_config = Some(ThinkingConfig {
            thinking_level: level.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config
            .get_or_insert_with(GenerationConfig::empty)
            .temperature = Some(temperature);
        self
    }
}

impl GenerationConfig {
    fn empty() -> Self {
        Self {
            temperature: None,
            thinking_config: None,
        }
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, config: &GeminiConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            thinking_level: config.thinking_level.clone(),
            temperature: config.temperature,
        })
    }

    /// The generateContent URL for the configured model
    pub fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Turn a non-success HTTP status and its body into a provider error
pub fn error_for_status(status: u16, body: &str, retry_after_secs: Option<u64>) -> ProviderError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded {
            message,
            retry_after_secs,
        },
        _ => ProviderError::ApiError {
            status_code: status,
            message,
        },
    }
}

fn retry_after(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[async_trait]
impl Provider for Gemini {
    type Request = GeminiRequest;
    type Response = GeminiResponse;

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        let mut request = GeminiRequest::new(prompt);
        if let Some(level) = &self.thinking_level {
            request = request.thinking_level(level.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }
        request
    }

    async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let response = self
            .client
            .post(self.api_url())
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = if status == StatusCode::TOO_MANY_REQUESTS {
                retry_after(response.headers())
            } else {
                None
            };
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(error_for_status(status.as_u16(), &error_text, retry_after_secs));
        }

        let gemini_response = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))?;

        check_response(&gemini_response)?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                "Gemini usage: {} prompt tokens, {} candidate tokens",
                usage.prompt_token_count.unwrap_or(0),
                usage.candidates_token_count.unwrap_or(0)
            );
        }

        Ok(gemini_response)
    }

    fn extract_text(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.thought.unwrap_or(false))
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Reject successful HTTP responses that carry no usable answer
pub fn check_response(response: &GeminiResponse) -> Result<(), ProviderError> {
    if let Some(error) = &response.error {
        return Err(ProviderError::ApiError {
            status_code: error.code.unwrap_or(500),
            message: error.message.clone(),
        });
    }

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(ProviderError::ParseError(format!("Prompt was blocked: {}", reason)));
    }

    let has_text = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .is_some_and(|content| content.parts.iter().any(|part| part.text.is_some()));

    if !has_text {
        let finish_reason = response
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
            .unwrap_or("none");
        return Err(ProviderError::ParseError(format!(
            "Response contained no text (finish reason: {})",
            finish_reason
        )));
    }

    Ok(())
}
