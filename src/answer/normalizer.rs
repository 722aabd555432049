// file: src/answer/normalizer.rs
// description: ordered clean-up of raw generator output
// reference: internal answer presentation rules

use crate::answer::patterns::{
    ANSWER_LABEL, CONTEXT_PREFACE, ECHO_LINE, HELP_CLOSER, INSTRUCTION_LEAK_LINE,
    OPTION_MARKER_LINE, OPTION_MENU_LINE,
};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Upper bound on full passes; real answers settle in two or three.
const MAX_PASSES: usize = 32;

/// Unterminated trailing text shorter than this is treated as a cut-off fragment.
const MIN_FRAGMENT_CHARS: usize = 10;

const PHRASE_LEN: usize = 4;
const MAX_PHRASE_OCCURRENCES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub text: String,
    /// Whether the gap before this sentence contained a line break.
    pub starts_line: bool,
}

pub struct AnswerNormalizer;

impl AnswerNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Total and idempotent; blank input comes back unchanged.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return raw.to_string();
        }

        let (normalized, settled) = settle(raw, MAX_PASSES, |text| self.normalize_once(text));
        if !settled {
            warn!(
                "Answer normalization did not settle after {} passes; output may not be idempotent",
                MAX_PASSES
            );
        }
        normalized
    }

    fn normalize_once(&self, input: &str) -> String {
        let stripped = strip_boilerplate(input);
        let stripped = drop_option_markers(&stripped);

        let sentences = dedupe_sentences(split_sentences(&stripped));
        if sentences.is_empty() {
            return ensure_terminator(input.trim());
        }

        let joined = join_sentences(&sentences);
        let collapsed = collapse_repeated_phrases(&joined);
        ensure_terminator(collapsed.trim())
    }
}

impl Default for AnswerNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `step` until the text stops changing or `max_passes` runs out.
/// The flag is false when the cap was hit first.
fn settle(input: &str, max_passes: usize, step: impl Fn(&str) -> String) -> (String, bool) {
    let mut current = input.to_string();
    for _ in 0..max_passes {
        let next = step(&current);
        if next == current {
            return (current, true);
        }
        current = next;
    }
    (current, false)
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '।')
}

pub fn strip_boilerplate(text: &str) -> String {
    let text = INSTRUCTION_LEAK_LINE.replace_all(text, "");
    let text = ECHO_LINE.replace_all(&text, "");
    let text = OPTION_MENU_LINE.replace_all(&text, "");
    let text = ANSWER_LABEL.replace_all(&text, "");
    let text = CONTEXT_PREFACE.replace_all(&text, "${1}");
    let text = HELP_CLOSER.replace_all(&text, "");
    text.into_owned()
}

pub fn drop_option_markers(text: &str) -> String {
    text.lines()
        .filter(|line| !OPTION_MARKER_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A run of terminators closes a sentence only when followed by whitespace
/// or the end of text, so decimals such as `12.5` stay whole.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !is_terminator(chars[i].1) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && is_terminator(chars[j].1) {
            j += 1;
        }

        if j == chars.len() || chars[j].1.is_whitespace() {
            let end = if j == chars.len() {
                text.len()
            } else {
                chars[j].0
            };
            push_segment(&text[start..end], &mut sentences);
            start = end;
        }
        i = j;
    }

    let tail = &text[start..];
    if tail.trim().chars().count() >= MIN_FRAGMENT_CHARS {
        push_segment(tail, &mut sentences);
    }

    sentences
}

fn push_segment(segment: &str, out: &mut Vec<Sentence>) {
    let content = segment.trim();
    if !content.chars().any(char::is_alphanumeric) {
        return;
    }

    let gap_len = segment.len() - segment.trim_start().len();
    out.push(Sentence {
        text: content.to_string(),
        starts_line: segment[..gap_len].contains('\n'),
    });
}

fn sentence_key(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(is_terminator)
        .to_string()
}

pub fn dedupe_sentences(sentences: Vec<Sentence>) -> Vec<Sentence> {
    let mut seen = HashSet::new();
    sentences
        .into_iter()
        .filter(|sentence| seen.insert(sentence_key(&sentence.text)))
        .collect()
}

fn join_sentences(sentences: &[Sentence]) -> String {
    let mut out = String::new();
    for (i, sentence) in sentences.iter().enumerate() {
        if i > 0 {
            out.push(if sentence.starts_line { '\n' } else { ' ' });
        }
        out.push_str(&sentence.text);
    }
    out
}

fn phrase_key(word: &str) -> String {
    word.trim_matches(|c: char| c.is_ascii_punctuation() || c == '।' || c == '॥')
        .to_lowercase()
}

/// Keeps only the first occurrence of any 4-word phrase seen more than twice.
pub fn collapse_repeated_phrases(text: &str) -> String {
    // (leading whitespace, word)
    let mut tokens: Vec<(String, String)> = Vec::new();
    let mut gap = String::new();
    let mut word = String::new();

    for c in text.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                tokens.push((std::mem::take(&mut gap), std::mem::take(&mut word)));
            }
            gap.push(c);
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push((gap, word));
    }

    while let Some(positions) = find_repeated_phrase(&tokens) {
        for &position in positions.iter().skip(1).rev() {
            tokens.drain(position..position + PHRASE_LEN);
        }
    }

    let rebuilt: String = tokens
        .iter()
        .map(|(gap, word)| format!("{}{}", gap, word))
        .collect();
    rebuilt.trim_start().to_string()
}

/// Non-overlapping start positions of the first phrase, in order of first
/// appearance, that occurs more than twice.
fn find_repeated_phrase(tokens: &[(String, String)]) -> Option<Vec<usize>> {
    if tokens.len() < PHRASE_LEN {
        return None;
    }

    let keys: Vec<String> = tokens.iter().map(|(_, w)| phrase_key(w)).collect();
    let mut order: Vec<Vec<String>> = Vec::new();
    let mut positions: HashMap<Vec<String>, Vec<usize>> = HashMap::new();

    for start in 0..=keys.len() - PHRASE_LEN {
        let gram = &keys[start..start + PHRASE_LEN];
        if gram.iter().any(|k| k.is_empty()) {
            continue;
        }

        let entry = positions.entry(gram.to_vec()).or_default();
        if entry.is_empty() {
            order.push(gram.to_vec());
        }
        if entry.last().is_none_or(|&last| start >= last + PHRASE_LEN) {
            entry.push(start);
        }
    }

    order
        .into_iter()
        .filter_map(|gram| positions.remove(&gram))
        .find(|found| found.len() > MAX_PHRASE_OCCURRENCES)
}

pub fn ensure_terminator(text: &str) -> String {
    match text.chars().last() {
        Some(c) if is_terminator(c) => text.to_string(),
        Some(_) => format!("{}.", text),
        None => String::new(),
    }
}
