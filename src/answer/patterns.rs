// file: src/answer/patterns.rs
// description: compiled regex patterns for tokenization and answer clean-up
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Tokenization
    pub static ref WORD_TOKEN: Regex = Regex::new(
        r"\w+"
    ).expect("WORD_TOKEN regex is valid");

    pub static ref DEVANAGARI: Regex = Regex::new(
        r"[\u{0900}-\u{097F}]"
    ).expect("DEVANAGARI regex is valid");

    pub static ref HINGLISH_MARKER: Regex = Regex::new(
        r"(?i)\b(?:kya|kaun|kaise|kitna|kitne|kahan|kab|kyun|hai|hain|tha|thi|ka|ki|ke|ko|mein|me|se|aur|nahi|batao|bataiye)\b"
    ).expect("HINGLISH_MARKER regex is valid");

    // Leaked prompt scaffolding
    pub static ref INSTRUCTION_LEAK_LINE: Regex = Regex::new(
        r"(?im)^.*\b(?:use only the provided context|answering rules|formatting rules|language rules|respond exactly once|do not provide translations)\b.*$"
    ).expect("INSTRUCTION_LEAK_LINE regex is valid");

    pub static ref ECHO_LINE: Regex = Regex::new(
        r"(?im)^[ \t]*(?:question|context|प्रश्न|संदर्भ)[ \t]*[:：].*$"
    ).expect("ECHO_LINE regex is valid");

    pub static ref OPTION_MENU_LINE: Regex = Regex::new(
        r"(?im)^[ \t]*(?:options?|choices?|विकल्प)[ \t]*[:：].*$"
    ).expect("OPTION_MENU_LINE regex is valid");

    pub static ref ANSWER_LABEL: Regex = Regex::new(
        r"(?im)^[ \t]*(?:final answer|answer|उत्तर)[ \t]*[:：][ \t]*"
    ).expect("ANSWER_LABEL regex is valid");

    // Only at the start of a line or sentence; group 1 keeps the boundary.
    pub static ref CONTEXT_PREFACE: Regex = Regex::new(
        r"(?im)(^[ \t]*|[.!?।][ \t]+)(?:according to|based on|as per|from) the (?:provided |given |above )?(?:context|document|text)\b[ \t]*[,:]?[ \t]*"
    ).expect("CONTEXT_PREFACE regex is valid");

    pub static ref HELP_CLOSER: Regex = Regex::new(
        r"(?i)\bi hope (?:this|that) helps\b[.!]*"
    ).expect("HELP_CLOSER regex is valid");

    // Bare multiple-choice markers such as "A)", "(b)", "Option C", "1."
    pub static ref OPTION_MARKER_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:option\s*)?[(\[]?[a-d1-4][)\]]?[.:)]*\s*$"
    ).expect("OPTION_MARKER_LINE regex is valid");
}
