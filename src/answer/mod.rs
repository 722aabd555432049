// file: src/answer/mod.rs
// description: answer generation, grounding and normalization module exports
// reference: internal module structure

pub mod generator;
pub mod grounding;
pub mod messages;
pub mod normalizer;
pub mod patterns;

pub use generator::{AnswerGenerator, ChatCompletionClient};
pub use grounding::{GroundingValidator, Language, Verdict};
pub use normalizer::AnswerNormalizer;
