/*!
 * Tests for application configuration
 */

use anyhow::Result;
use tokio_test::{assert_err, assert_ok};

use erbify::app_config::{Config, LogLevel, RetryPolicy};
use erbify::errors::AppError;

use crate::common;

fn valid_config() -> Config {
    Config {
        api_key: "test-key".to_string(),
        ..Config::default()
    }
}

#[test]
fn test_default_config_shouldMatchDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.source_format, "haml");
    assert_eq!(config.gemini.model, "gemini-3-pro-preview");
    assert_eq!(config.gemini.thinking_level.as_deref(), Some("low"));
    assert_eq!(config.batch.lane_count, 8);
    assert_eq!(config.batch.max_attempts, 4);
    assert_eq!(config.batch.retry_policy, RetryPolicy::Transient);
    assert!(!config.batch.force_overwrite);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withApiKey_shouldSucceed() {
    assert_ok!(valid_config().validate());
}

#[test]
fn test_validate_withoutApiKey_shouldFail() {
    let config = Config {
        api_key: "   ".to_string(),
        ..Config::default()
    };

    match config.validate() {
        Err(AppError::Config(message)) => assert!(message.contains("GOOGLE_API_KEY")),
        other => panic!("expected a config error, got {:?}", other),
    }
}

#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = valid_config();
    config.source_format = "html.haml".to_string();
    assert_err!(config.validate());

    let mut config = valid_config();
    config.gemini.endpoint = "not a url".to_string();
    assert_err!(config.validate());

    let mut config = valid_config();
    config.gemini.model = String::new();
    assert_err!(config.validate());

    let mut config = valid_config();
    config.batch.lane_count = 0;
    assert_err!(config.validate());

    let mut config = valid_config();
    config.batch.max_attempts = 0;
    assert_err!(config.validate());
}

#[test]
fn test_from_file_withPartialJson_shouldKeepDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "erbify.json",
        r#"{ "source_format": "slim", "batch": { "lane_count": 2, "retry_policy": "always" } }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.source_format, "slim");
    assert_eq!(config.batch.lane_count, 2);
    assert_eq!(config.batch.retry_policy, RetryPolicy::Always);
    assert_eq!(config.batch.max_attempts, 4);
    assert_eq!(config.gemini.model, "gemini-3-pro-preview");
    assert!(config.api_key.is_empty());
    Ok(())
}

#[test]
fn test_from_file_withMalformedJson_shouldReturnConfigError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ lanes: ")?;

    assert!(matches!(Config::from_file(&path), Err(AppError::Config(_))));
    Ok(())
}

#[test]
fn test_serialize_shouldNotWriteApiKey() -> Result<()> {
    let json = serde_json::to_string(&valid_config())?;
    assert!(!json.contains("test-key"));
    Ok(())
}

#[test]
fn test_retry_policy_allows_retry_shouldRespectClassification() {
    assert!(RetryPolicy::Transient.allows_retry(true));
    assert!(!RetryPolicy::Transient.allows_retry(false));
    assert!(RetryPolicy::Always.allows_retry(true));
    assert!(RetryPolicy::Always.allows_retry(false));
    assert_eq!(RetryPolicy::Always.to_string(), "always");
}
