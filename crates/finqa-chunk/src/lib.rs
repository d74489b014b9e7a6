//! finqa-chunk
//!
//! Fine-grained knowledge chunking: splits document text into bounded,
//! enriched fragments along heading/table structure, with overlap carried
//! across size splits. Fragment precision beats retrieval speed here.

pub mod chunker;
pub mod rules;

pub use chunker::Chunker;
pub use rules::{classify_line, LineKind};
