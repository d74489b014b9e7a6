//! finqa-semantic
//!
//! Thin adapter over the embedding and vector-index collaborators, plus the
//! in-process reference implementations used in tests and offline runs: a
//! deterministic hashed embedder and an exact inner-product index.

pub mod channel;
pub mod embed;
pub mod flat;

pub use channel::SemanticChannel;
pub use embed::{l2_normalize, HashEmbedder};
pub use flat::FlatIpIndex;
