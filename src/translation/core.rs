/*!
 * Core translation service implementation.
 *
 * This module contains the `Translator` seam used by the file converter and
 * the provider-backed `TranslationService` that implements it.
 */

use async_trait::async_trait;
use log::trace;
use std::time::Instant;

use crate::errors::TranslationError;
use crate::providers::Provider;

use super::prompts::PromptTemplate;
use super::sanitize::ResponseSanitizer;

/// Anything that can turn template source of one dialect into ERB
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`, written in the `source_format` dialect, into clean ERB.
    ///
    /// Issues exactly one request to the underlying service.
    async fn translate(&self, text: &str, source_format: &str) -> Result<String, TranslationError>;
}

/// Translation service backed by an LLM provider
pub struct TranslationService<P: Provider> {
    /// Provider implementation
    provider: P,

    /// Instruction wrapped around every source file
    template: PromptTemplate,
}

impl<P: Provider> TranslationService<P> {
    /// Create a new translation service with the default ERB prompt
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            template: PromptTemplate::default(),
        }
    }

    /// Replace the prompt template
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider> Translator for TranslationService<P> {
    async fn translate(&self, text: &str, source_format: &str) -> Result<String, TranslationError> {
        let prompt = self.template.render(source_format, text);
        let request = self.provider.build_request(&prompt);

        let start_time = Instant::now();
        let response = self.provider.complete(request).await?;
        trace!("Translation request completed in {:?}", start_time.elapsed());

        let translated = ResponseSanitizer::sanitize(&P::extract_text(&response));
        if translated.is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(translated)
    }
}
