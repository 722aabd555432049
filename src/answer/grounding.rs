// file: src/answer/grounding.rs
// description: lexical grounding check and question language detection
// reference: internal anti-hallucination rules

use crate::answer::patterns::{DEVANAGARI, HINGLISH_MARKER, WORD_TOKEN};
use crate::models::Passage;
use crate::utils::template::NOT_FOUND_SENTINEL;
use std::collections::HashSet;

/// Refusal phrase used by earlier prompt revisions; treated like the sentinel.
const LEGACY_REFUSAL: &str = "i do not know";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Grounded,
    /// The generator replied with the not-found sentinel.
    Sentinel,
    /// Too few tokens in common with the retrieved passages.
    Unsupported { shared: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Hindi,
    Hinglish,
}

impl Language {
    pub fn detect(text: &str) -> Self {
        if DEVANAGARI.is_match(text) {
            Self::Hindi
        } else if HINGLISH_MARKER.is_match(text) {
            Self::Hinglish
        } else {
            Self::English
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Hindi => "hindi",
            Self::Hinglish => "hinglish",
        }
    }
}

pub struct GroundingValidator {
    min_shared_tokens: usize,
}

impl GroundingValidator {
    pub fn new(min_shared_tokens: usize) -> Self {
        Self { min_shared_tokens }
    }

    pub fn is_grounded(&self, answer: &str, passages: &[&Passage]) -> bool {
        self.shared_tokens(answer, passages) >= self.min_shared_tokens
    }

    pub fn assess(&self, answer: &str, passages: &[&Passage]) -> Verdict {
        if is_sentinel(answer) {
            return Verdict::Sentinel;
        }

        let shared = self.shared_tokens(answer, passages);
        if shared >= self.min_shared_tokens {
            Verdict::Grounded
        } else {
            Verdict::Unsupported { shared }
        }
    }

    /// Distinct lowercase word tokens present in both the answer and any passage.
    pub fn shared_tokens(&self, answer: &str, passages: &[&Passage]) -> usize {
        let answer_tokens = tokenize(answer);
        if answer_tokens.is_empty() {
            return 0;
        }

        let mut context_tokens = HashSet::new();
        for passage in passages {
            context_tokens.extend(tokenize(&passage.text));
        }

        answer_tokens.intersection(&context_tokens).count()
    }
}

impl Default for GroundingValidator {
    fn default() -> Self {
        Self::new(2)
    }
}

pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD_TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn is_sentinel(answer: &str) -> bool {
    let trimmed = answer.trim().trim_end_matches('.').trim();
    trimmed.eq_ignore_ascii_case(NOT_FOUND_SENTINEL) || trimmed.eq_ignore_ascii_case(LEGACY_REFUSAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PassageDraft, PassageKind};

    fn passage(text: &str) -> Passage {
        let draft = PassageDraft::new(text, "g.pdf", 1, PassageKind::Text).unwrap();
        Passage::from_draft(draft, vec![])
    }

    #[test]
    fn test_two_shared_tokens_is_grounded() {
        let validator = GroundingValidator::default();
        let context = passage("Revenue grew by 12% in 2023.");
        assert!(validator.is_grounded("The revenue grew strongly", &[&context]));
    }

    #[test]
    fn test_one_shared_token_is_not_grounded() {
        let validator = GroundingValidator::default();
        let context = passage("Revenue grew by 12% in 2023.");
        assert!(!validator.is_grounded("Revenue was flat", &[&context]));
        assert_eq!(
            validator.assess("Revenue was flat", &[&context]),
            Verdict::Unsupported { shared: 1 }
        );
    }

    #[test]
    fn test_tokens_are_case_insensitive_and_distinct() {
        let validator = GroundingValidator::default();
        let context = passage("revenue revenue revenue");
        assert_eq!(validator.shared_tokens("REVENUE Revenue", &[&context]), 1);
    }

    #[test]
    fn test_devanagari_grounding() {
        let validator = GroundingValidator::default();
        let context = passage("अनुमोदन तिथि: 10 जनवरी");
        assert!(validator.is_grounded("अनुमोदन तिथि 10 जनवरी है।", &[&context]));
    }

    #[test]
    fn test_sentinel_detection() {
        let validator = GroundingValidator::default();
        let context = passage("NOT_FOUND appears here too");
        assert_eq!(validator.assess("  not_found. ", &[&context]), Verdict::Sentinel);
        assert_eq!(validator.assess("I do not know.", &[&context]), Verdict::Sentinel);
        assert!(!is_sentinel("NOT_FOUND in the table"));
    }

    #[test]
    fn test_no_passages_never_grounded() {
        let validator = GroundingValidator::default();
        assert!(!validator.is_grounded("anything goes here", &[]));
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(Language::detect("अनुमोदन तिथि क्या है?"), Language::Hindi);
        assert_eq!(Language::detect("company ka address kya hai"), Language::Hinglish);
        assert_eq!(Language::detect("What was the revenue growth?"), Language::English);
    }
}
