/*!
 * Tests for the retrying converter
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use erbify::app_config::RetryPolicy;
use erbify::conversion::ConversionTask;
use erbify::providers::mock::MockProvider;
use erbify::translation::TranslationService;

use crate::common::{self, RemovalBlockingTranslator, ScriptedTranslator, retrying_converter};

#[tokio::test]
async fn test_convert_with_retry_withTwoTransientFailures_shouldSucceedOnThirdAttempt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "a.html.haml", common::SAMPLE_HAML)?;
    let translator = Arc::new(ScriptedTranslator::failing_then_ok(2));
    let (retrying, counters) = retrying_converter(translator.clone(), 4, RetryPolicy::Transient);

    let outcome = retrying
        .convert_with_retry(&ConversionTask::new(&source, "haml"), 0)
        .await;

    assert!(outcome.is_success());
    assert_eq!(translator.calls(), 3);
    let counts = counters.snapshot();
    assert_eq!(counts.succeeded, 1);
    assert_eq!(counts.retries, 2);
    assert_eq!(counts.failed, 0);
    assert!(temp_dir.path().join("a.html.erb").exists());
    Ok(())
}

#[tokio::test]
async fn test_convert_with_retry_withPersistentFailure_shouldStopAfterMaxAttempts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "a.html.haml", common::SAMPLE_HAML)?;
    let provider = MockProvider::failing();
    let (retrying, counters) = retrying_converter(
        Arc::new(TranslationService::new(provider.clone())),
        4,
        RetryPolicy::Transient,
    );

    let outcome = retrying
        .convert_with_retry(&ConversionTask::new(&source, "haml"), 3)
        .await;

    assert!(!outcome.is_success());
    assert_eq!(provider.request_count(), 4);
    assert_eq!(fs::read_to_string(&source)?, common::SAMPLE_HAML);
    assert_eq!(common::list_dir(temp_dir.path())?, vec!["a.html.haml"]);

    let counts = counters.snapshot();
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.retries, 3);
    assert_eq!(counts.succeeded, 0);
    Ok(())
}

#[tokio::test]
async fn test_convert_with_retry_withTerminalFailure_shouldNotRetryUnderTransientPolicy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "a.html.haml", common::SAMPLE_HAML)?;
    let provider = MockProvider::unauthorized();
    let (retrying, counters) = retrying_converter(
        Arc::new(TranslationService::new(provider.clone())),
        4,
        RetryPolicy::Transient,
    );

    let outcome = retrying
        .convert_with_retry(&ConversionTask::new(&source, "haml"), 0)
        .await;

    assert!(!outcome.is_success());
    assert_eq!(provider.request_count(), 1);
    assert_eq!(counters.snapshot().retries, 0);
    Ok(())
}

#[tokio::test]
async fn test_convert_with_retry_withAlwaysPolicy_shouldRetryTerminalFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "a.html.haml", common::SAMPLE_HAML)?;
    let provider = MockProvider::unauthorized();
    let (retrying, counters) = retrying_converter(
        Arc::new(TranslationService::new(provider.clone())),
        4,
        RetryPolicy::Always,
    );

    retrying
        .convert_with_retry(&ConversionTask::new(&source, "haml"), 0)
        .await;

    assert_eq!(provider.request_count(), 4);
    assert_eq!(counters.snapshot().failed, 1);
    Ok(())
}

#[tokio::test]
async fn test_convert_with_retry_withSingleAttempt_shouldNotRetry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "a.html.haml", common::SAMPLE_HAML)?;
    let translator = Arc::new(ScriptedTranslator::failing_then_ok(1));
    let (retrying, _) = retrying_converter(translator.clone(), 1, RetryPolicy::Always);

    let outcome = retrying
        .convert_with_retry(&ConversionTask::new(&source, "haml"), 0)
        .await;

    assert!(!outcome.is_success());
    assert_eq!(translator.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_convert_with_retry_withBackoff_shouldStillSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "a.html.haml", common::SAMPLE_HAML)?;
    let translator = Arc::new(ScriptedTranslator::failing_then_ok(2));
    let (retrying, _) = retrying_converter(translator.clone(), 4, RetryPolicy::Transient);
    let retrying = retrying.backoff_ms(5);

    let outcome = retrying
        .convert_with_retry(&ConversionTask::new(&source, "haml"), 0)
        .await;

    assert!(outcome.is_success());
    assert_eq!(translator.calls(), 3);
    Ok(())
}

#[tokio::test]
async fn test_convert_with_retry_afterFailedRemoval_shouldFinishRemovalWithoutTranslatingAgain() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "a.html.haml", common::SAMPLE_HAML)?;
    let translator =
        Arc::new(RemovalBlockingTranslator::new(&source).restore_after(Duration::from_millis(20)));
    let (retrying, counters) = retrying_converter(translator.clone(), 4, RetryPolicy::Always);
    let retrying = retrying.backoff_ms(300);

    let outcome = retrying
        .convert_with_retry(&ConversionTask::new(&source, "haml"), 0)
        .await;

    assert!(outcome.is_success());
    assert_eq!(translator.calls(), 1);
    assert!(!source.exists());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("a.html.erb"))?,
        "<p><%= @title %></p>"
    );
    let counts = counters.snapshot();
    assert_eq!(counts.retries, 1);
    assert_eq!(counts.failed, 0);
    Ok(())
}
