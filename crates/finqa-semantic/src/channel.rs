//! The semantic retrieval channel: embedder + vector index behind one seam.

use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use finqa_core::store::ChunkStore;
use finqa_core::text::truncate_chars;
use finqa_core::traits::{Embedder, VectorIndex};
use finqa_core::types::{Channel, ChannelHit};

use crate::embed::l2_normalize;
use crate::flat::FlatIpIndex;

const EMBED_BATCH: usize = 32;

/// Owns the embedding handle and the vector index for one build. Populated
/// once by the index builder, read-only afterwards.
pub struct SemanticChannel {
    embedder: Arc<dyn Embedder>,
    index: Box<dyn VectorIndex>,
}

impl SemanticChannel {
    pub fn new(embedder: Arc<dyn Embedder>, index: Box<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Reference channel: hashed embeddings over a flat inner-product index.
    pub fn in_process(embedder: Arc<dyn Embedder>) -> Self {
        let index = Box::new(FlatIpIndex::new(embedder.dim()));
        Self::new(embedder, index)
    }

    /// Embed every fragment (text capped to the embedder's input limit) and
    /// add the normalized vectors under their fragment ids.
    pub fn build(&mut self, store: &ChunkStore) -> Result<()> {
        if store.is_empty() {
            tracing::info!("no fragments to embed");
            return Ok(());
        }
        let pb = ProgressBar::new(store.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} fragments ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let fragments = store.fragments();
        for batch in fragments.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch
                .iter()
                .map(|f| truncate_chars(&f.text, self.embedder.max_len()).to_string())
                .collect();
            let mut vectors = self.embedder.encode_batch(&texts)?;
            for v in &mut vectors {
                l2_normalize(v);
            }
            let ids: Vec<String> = batch.iter().map(|f| f.fragment_id.clone()).collect();
            self.index.add(&ids, &vectors)?;
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
        tracing::info!(fragments = store.len(), "semantic channel populated");
        Ok(())
    }

    /// Top-k fragments by similarity to the normalized query embedding.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ChannelHit>> {
        let bounded = truncate_chars(query, self.embedder.max_len()).to_string();
        let mut vectors = self.embedder.encode_batch(&[bounded])?;
        anyhow::ensure!(!vectors.is_empty(), "embedder returned no query vector");
        let mut query_vec = vectors.remove(0);
        l2_normalize(&mut query_vec);

        let hits = self.index.search(&query_vec, k)?;
        Ok(hits
            .into_iter()
            .map(|(id, sim)| ChannelHit { id, score: f64::from(sim), channel: Channel::Semantic })
            .collect())
    }
}
