// file: src/parser/mod.rs
// description: document assembly and chunking module exports
// reference: internal module structure

pub mod assembler;
pub mod chunker;

pub use assembler::{AssembledDocument, AssemblyStats, DocumentAssembler, TABLE_CELL_DELIMITER};
pub use chunker::{Chunk, Chunker};
