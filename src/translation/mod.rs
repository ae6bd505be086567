/*!
 * Translation of template source through an AI provider.
 *
 * - `core`: the `Translator` seam and the provider-backed service
 * - `prompts`: the conversion instruction sent with every file
 * - `sanitize`: cleanup of fence markers in service answers
 */

// Re-export main types for easier usage
pub use self::core::{TranslationService, Translator};
pub use self::prompts::PromptTemplate;
pub use self::sanitize::ResponseSanitizer;

// Submodules
pub mod core;
pub mod prompts;
pub mod sanitize;
