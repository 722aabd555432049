// file: src/history/mod.rs
// description: chat transcript persistence module exports
// reference: internal module structure

pub mod transcript;

pub use transcript::{Role, TranscriptEntry, TranscriptStore};
