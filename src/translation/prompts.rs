/*!
 * Prompt templates for template-dialect conversion.
 *
 * The service receives a single natural-language instruction with the source
 * file embedded verbatim at the end.
 */

/// Instruction template for converting one template file.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Placeholders: {format} (upper-cased dialect tag), {source}
    pub const ERB_CONVERTER: &'static str = "You are an expert Ruby on Rails developer.
Convert the following {format} code to valid ERB (Embedded Ruby).
Do not include any markdown formatting, backticks, or explanation.
Return ONLY the raw ERB code.

{format} Code:
{source}";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default ERB conversion template.
    pub fn erb_converter() -> Self {
        Self::new(Self::ERB_CONVERTER)
    }

    /// Render the template for one file.
    ///
    /// The source is substituted last so placeholder-looking text inside a
    /// template file is never expanded.
    pub fn render(&self, source_format: &str, source: &str) -> String {
        self.template
            .replace("{format}", &source_format.to_uppercase())
            .replace("{source}", source)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::erb_converter()
    }
}
