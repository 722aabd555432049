// file: src/utils/template.rs
// description: question-answering prompt template with placeholder substitution
// reference: Internal prompt standards

use crate::error::{PipelineError, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;

/// Reply the generator is instructed to give when the context lacks the answer.
pub const NOT_FOUND_SENTINEL: &str = "NOT_FOUND";

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{([a-z_]+)\}").expect("PLACEHOLDER regex is valid");
}

const DEFAULT_TEMPLATE: &str = "You are a helpful assistant for Hindi/English/Hinglish PDF QA.\n\
Use ONLY the provided context to answer. If the answer is not in the context, reply exactly: NOT_FOUND\n\
Respond exactly once in the same language as the question. Do not provide translations or multiple versions.\n\n\
Answering rules:\n\
- Answer exactly what is asked. If the question specifies criteria (location, date, category, etc.), only include items that match those criteria exactly.\n\
- For location-based questions, check the location column of EACH table row individually and only include rows that explicitly mention the requested place.\n\
- Be precise and do not include irrelevant information. Do not guess or assume.\n\n\
Formatting rules:\n\
1. For lists of multiple items, use bullet points.\n\
2. For pairs of related information (name + value), use a Markdown table.\n\
3. Never write lists as paragraphs.\n\n\
Language rules:\n\
- If the question is mostly in English, answer in English.\n\
- If the question is mostly in Hindi (Devanagari), answer in Hindi.\n\
- If the question is in Hinglish (Hindi written with Latin letters), answer in Hinglish.\n\n\
Context:\n{context}\n\nQuestion:\n{question}\n\nAnswer:";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Custom templates must reference both `{context}` and `{question}`.
    pub fn with_custom_template(template: String) -> Result<Self> {
        let prompt = Self { template };
        prompt.validate()?;
        Ok(prompt)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| PipelineError::FileOperation {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::with_custom_template(template)
    }

    pub fn render(&self, context: &str, question: &str) -> String {
        let mut values = HashMap::new();
        values.insert("context".to_string(), context.to_string());
        values.insert("question".to_string(), question.to_string());
        self.render_with_map(&values)
    }

    /// Substitutes in one pass over the template, so placeholder-like text
    /// inside the values is never expanded.
    pub fn render_with_map(&self, values: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| {
                values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    pub fn validate(&self) -> Result<()> {
        for required in ["{context}", "{question}"] {
            if !self.template.contains(required) {
                return Err(PipelineError::Config(format!(
                    "Prompt template is missing the {} placeholder",
                    required
                )));
            }
        }
        Ok(())
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_renders_both_fields() {
        let prompt = PromptTemplate::new().render("Revenue grew by 12%.", "What was growth?");

        assert!(prompt.contains("Context:\nRevenue grew by 12%."));
        assert!(prompt.contains("Question:\nWhat was growth?"));
        assert!(prompt.contains(NOT_FOUND_SENTINEL));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let prompt = PromptTemplate::with_custom_template("{context}|{question}".to_string())
            .unwrap()
            .render("literal {question}", "q");
        assert_eq!(prompt, "literal {question}|q");
    }

    #[test]
    fn test_custom_template_requires_placeholders() {
        assert!(PromptTemplate::with_custom_template("only {context}".to_string()).is_err());
    }

    #[test]
    fn test_unknown_placeholder_left_intact() {
        let template = PromptTemplate::with_custom_template(
            "{context} {question} {language}".to_string(),
        )
        .unwrap();
        assert_eq!(template.render("c", "q"), "c q {language}");
    }
}
