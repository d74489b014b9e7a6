//! finqa-hybrid
//!
//! The hybrid retrieval and ranking engine: per-intent query plans over a
//! fused lexical (BM25) + semantic (vector) candidate pool, with min-max
//! score normalization, weighted fusion, dedup and content cleanup. Also
//! owns the offline index build, its atomic write-once publication, and
//! snapshot persistence.

pub mod build;
pub mod clean;
pub mod engine;
pub mod fuse;
pub mod rank;

pub use build::{IndexBuilder, KnowledgeIndex};
pub use clean::clean_content;
pub use engine::{EngineConfig, HybridEngine};
pub use rank::diversify;
