//! Exact inner-product vector index.
//!
//! Reference implementation of the vector-index collaborator: a flat scan
//! over normalized vectors, where inner product equals cosine similarity.
//! Production deployments swap in an ANN provider behind the same trait.

use finqa_core::traits::VectorIndex;
use finqa_core::types::FragmentId;

pub struct FlatIpIndex {
    dim: usize,
    ids: Vec<FragmentId>,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, ids: Vec::new(), vectors: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl VectorIndex for FlatIpIndex {
    fn add(&mut self, ids: &[FragmentId], vectors: &[Vec<f32>]) -> anyhow::Result<()> {
        anyhow::ensure!(
            ids.len() == vectors.len(),
            "ids/vectors length mismatch: {} vs {}",
            ids.len(),
            vectors.len()
        );
        for v in vectors {
            anyhow::ensure!(v.len() == self.dim, "vector dim {} != index dim {}", v.len(), self.dim);
        }
        self.ids.extend_from_slice(ids);
        self.vectors.extend_from_slice(vectors);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> anyhow::Result<Vec<(FragmentId, f32)>> {
        anyhow::ensure!(query.len() == self.dim, "query dim {} != index dim {}", query.len(), self.dim);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .map(|v| v.iter().zip(query).map(|(x, y)| x * y).sum::<f32>())
            .enumerate()
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(pos, sim)| (self.ids[pos].clone(), sim))
            .collect())
    }
}
