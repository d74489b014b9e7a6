//! Deterministic hashed embeddings.
//!
//! Token-hash bag vectors: cheap, model-free, and deterministic, which is
//! exactly what index and fusion tests need. Real deployments plug a model
//! embedder in behind the same trait.

use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

use finqa_core::traits::Embedder;

pub const DEFAULT_DIM: usize = 1_024;

/// Chars of input the reference embedder looks at per text.
const EMBED_INPUT_CAP: usize = 2_000;

pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        EMBED_INPUT_CAP
    }

    fn encode_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.encode_one(t)).collect())
    }
}

impl HashEmbedder {
    fn encode_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        l2_normalize(&mut v);
        v
    }
}

/// In-place L2 normalization; near-zero vectors stay finite.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
    for x in v.iter_mut() {
        *x /= norm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_unit_vectors() {
        let embedder = HashEmbedder::default();
        let texts = vec!["hello world".to_string(), "hello world".to_string()];
        let embs = embedder.encode_batch(&texts).expect("encode");
        assert_eq!(embs[0].len(), DEFAULT_DIM);

        let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

        for (a, b) in embs[0].iter().zip(embs[1].iter()) {
            assert!((a - b).abs() <= 1e-6);
        }
    }

    #[test]
    fn shared_tokens_raise_similarity() {
        let embedder = HashEmbedder::default();
        let embs = embedder
            .encode_batch(&[
                "贷款 利率 流程".to_string(),
                "贷款 利率 条件".to_string(),
                "完全 无关 内容".to_string(),
            ])
            .expect("encode");
        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&embs[0], &embs[1]) > dot(&embs[0], &embs[2]));
    }
}
