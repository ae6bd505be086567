/*!
 * Tests for the Gemini wire format and the mock provider
 */

use anyhow::Result;

use erbify::errors::ProviderError;
use erbify::providers::Provider;
use erbify::providers::gemini::{Gemini, GeminiResponse, check_response, error_for_status};
use erbify::providers::mock::{DEFAULT_MOCK_OUTPUT, MockProvider};

fn parse(json: &str) -> GeminiResponse {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_error_for_status_withAuthStatuses_shouldReturnAuthenticationError() {
    let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;

    match error_for_status(403, body, None) {
        ProviderError::AuthenticationError(message) => assert_eq!(message, "API key not valid"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(matches!(
        error_for_status(401, "", None),
        ProviderError::AuthenticationError(_)
    ));
}

#[test]
fn test_error_for_status_with429_shouldCarryRetryAfter() {
    match error_for_status(429, "quota", Some(12)) {
        ProviderError::RateLimitExceeded {
            message,
            retry_after_secs,
        } => {
            assert_eq!(message, "quota");
            assert_eq!(retry_after_secs, Some(12));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_error_for_status_withServerError_shouldBeRetryableApiError() {
    let error = error_for_status(503, "  overloaded \n", None);
    assert!(matches!(
        &error,
        ProviderError::ApiError { status_code: 503, message } if message == "overloaded"
    ));
    assert!(error.is_retryable());
}

#[test]
fn test_extract_text_shouldSkipThoughtParts() {
    let response = parse(
        r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Let me think...", "thought": true},
                        {"text": "<p>"},
                        {"text": "hi</p>"}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }"#,
    );

    assert!(check_response(&response).is_ok());
    assert_eq!(Gemini::extract_text(&response), "<p>hi</p>");
}

#[test]
fn test_check_response_withBlockedPrompt_shouldFail() {
    let response = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);

    let error = check_response(&response).unwrap_err();
    assert!(error.to_string().contains("SAFETY"));
}

#[test]
fn test_check_response_withoutText_shouldReportFinishReason() {
    let response = parse(r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#);

    let error = check_response(&response).unwrap_err();
    assert!(matches!(error, ProviderError::ParseError(_)));
    assert!(error.to_string().contains("MAX_TOKENS"));
}

#[test]
fn test_check_response_withErrorObject_shouldReturnApiError() {
    let response = parse(r#"{"error": {"code": 500, "message": "internal"}}"#);

    assert!(matches!(
        check_response(&response),
        Err(ProviderError::ApiError { status_code: 500, .. })
    ));
}

#[tokio::test]
async fn test_mock_fail_first_shouldFailThenSucceed() -> Result<()> {
    let provider = MockProvider::fail_first(2);

    assert!(provider.complete(provider.build_request("a")).await.is_err());
    assert!(provider.complete(provider.build_request("b")).await.is_err());
    let response = provider.complete(provider.build_request("c")).await?;

    assert_eq!(MockProvider::extract_text(&response), DEFAULT_MOCK_OUTPUT);
    assert_eq!(provider.request_count(), 3);
    assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    Ok(())
}
