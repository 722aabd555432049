// file: src/database/mod.rs
// description: passage storage, embedding and indexing module exports
// reference: internal module structure

pub mod client;
pub mod embeddings;
pub mod index;
pub mod schema;
pub mod store;

pub use client::LanceVectorStore;
pub use embeddings::{Embedder, HashingEmbedder, HttpEmbeddingClient};
pub use index::{SearchParams, VectorIndex};
pub use store::{MemoryVectorStore, VectorStore};
