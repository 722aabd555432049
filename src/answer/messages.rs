// file: src/answer/messages.rs
// description: localized user-facing answer messages
// reference: internal presentation rules

use crate::answer::grounding::Language;

pub const NO_DOCUMENTS: &str =
    "⚠️ **No documents found in the database.**\n\nPlease upload a PDF first.";

pub const NO_RESPONSE: &str = "⚠️ **No response generated.**\n\nThe model did not produce an answer. Please check the source documents below.";

pub const NOT_FOUND_EN: &str = "Answer not found in context";

pub const NOT_FOUND_HI: &str = "उत्तर संदर्भ में नहीं मिला";

/// Hindi questions get the Devanagari message; everything else gets English.
pub fn not_found_for(question: &str) -> &'static str {
    match Language::detect(question) {
        Language::Hindi => NOT_FOUND_HI,
        Language::English => NOT_FOUND_EN,
        // Romanized Hindi readers get the Latin-script message; there is no
        // Hinglish wording of it.
        Language::Hinglish => NOT_FOUND_EN,
    }
}
