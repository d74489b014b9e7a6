//! Seams to the external collaborators. The core never talks to an embedding
//! model, a vector store or a tokenizer directly; service objects implementing
//! these traits are constructed once and passed in by reference.

use crate::types::FragmentId;

/// Embedding provider. `encode_batch` must be deterministic for a fixed
/// model/version; vectors are `dim()` long. Callers truncate input to
/// `max_len()` chars before encoding.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Nearest-neighbor provider. `search` returns (id, similarity) ordered best
/// first; similarity must be monotone in cosine similarity of the stored
/// vectors.
pub trait VectorIndex: Send + Sync {
    fn add(&mut self, ids: &[FragmentId], vectors: &[Vec<f32>]) -> anyhow::Result<()>;
    fn search(&self, query: &[f32], k: usize) -> anyhow::Result<Vec<(FragmentId, f32)>>;
}

/// Language-aware tokenizer. May fail on pathological input; callers go
/// through [`segment_bounded`](crate::segment::segment_bounded), which caps
/// input size and falls back to a punctuation split without raising.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>>;
}
