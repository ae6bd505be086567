/*!
 * Cleanup of raw service answers.
 *
 * Models wrap code in markdown fences even when told not to. A fence marker is
 * a line made of optional whitespace, three or more backticks and an optional
 * info string (`erb`, `html.erb`, ...). Only whole lines are removed, so
 * backticks elsewhere in the output are left alone.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening (with or without annotation) and closing fence lines.
/// The indent class is every whitespace `str::trim` strips, minus the newline.
static FENCE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[^\S\n]*`{3,}[^`\n]*$").unwrap());

/// Strips fence markers from translation service output
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    /// Remove fence marker lines, then trim surrounding whitespace.
    ///
    /// `sanitize(sanitize(x)) == sanitize(x)` holds for every input: removing a
    /// line never turns another line into a fence, and trimming never changes
    /// whether a line is one.
    pub fn sanitize(raw: &str) -> String {
        if !raw.contains("```") {
            return raw.trim().to_string();
        }

        FENCE_LINE_REGEX.replace_all(raw, "").trim().to_string()
    }
}
