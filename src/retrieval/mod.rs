// file: src/retrieval/mod.rs
// description: passage retrieval module exports
// reference: internal module structure

pub mod mmr;
pub mod retriever;

pub use mmr::cosine_similarity;
pub use retriever::Retriever;
