//! BM25 relevance scoring over an inverted index.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use finqa_core::segment::segment_bounded;
use finqa_core::store::ChunkStore;
use finqa_core::text::truncate_chars;
use finqa_core::traits::Segmenter;
use finqa_core::types::{Channel, ChannelHit, FragmentId};

/// Fragment text is truncated to this many chars before tokenization.
pub const FRAGMENT_TOKENIZE_CAP: usize = 5_000;
/// Queries are truncated to this many chars before tokenization.
pub const QUERY_TOKENIZE_CAP: usize = 500;

/// Term-frequency saturation (`k1`) and length normalization (`b`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Index statistics persisted alongside the fragment collection; enough to
/// verify that a reloaded index reproduces identical scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexicalStats {
    pub fragment_count: usize,
    pub avg_len: f64,
    pub df: BTreeMap<String, u32>,
}

/// Inverted BM25 index. Fully rebuilt on each `build`; read-only afterwards,
/// so it shares freely across concurrent query paths.
///
/// score(q, f) = Σ_t IDF(t) · tf(t,f)(k1+1) / (tf(t,f) + k1(1−b+b·|f|/avg)),
/// IDF(t) = ln((N − df + 0.5)/(df + 0.5) + 1), summed over unique query
/// terms.
pub struct Bm25Index {
    params: Bm25Params,
    segmenter: Arc<dyn Segmenter>,
    ids: Vec<FragmentId>,
    doc_lens: Vec<usize>,
    avg_len: f64,
    /// token → (fragment position, term frequency), ascending by position.
    postings: HashMap<String, Vec<(u32, u32)>>,
}

impl Bm25Index {
    /// Build the index over every fragment in the store, in store order.
    /// Tokenization is bounded and never fails; a degraded segmentation is
    /// logged per fragment and indexing proceeds on the fallback tokens.
    pub fn build(store: &ChunkStore, segmenter: Arc<dyn Segmenter>, params: Bm25Params) -> Self {
        let mut ids = Vec::with_capacity(store.len());
        let mut doc_lens = Vec::with_capacity(store.len());
        let mut postings: HashMap<String, Vec<(u32, u32)>> = HashMap::new();

        for (pos, fragment) in store.fragments().iter().enumerate() {
            let bounded = truncate_chars(&fragment.text, FRAGMENT_TOKENIZE_CAP);
            let (tokens, degraded) =
                segment_bounded(segmenter.as_ref(), bounded, FRAGMENT_TOKENIZE_CAP);
            if degraded {
                tracing::warn!(id = %fragment.fragment_id, "fragment indexed with fallback tokens");
            }

            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in &tokens {
                *tf.entry(token.clone()).or_insert(0) += 1;
            }
            // BTreeMap pass keeps posting insertion deterministic.
            for (token, freq) in tf.into_iter().collect::<BTreeMap<_, _>>() {
                postings.entry(token).or_default().push((pos as u32, freq));
            }

            ids.push(fragment.fragment_id.clone());
            doc_lens.push(tokens.len());
        }

        let avg_len = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f64 / doc_lens.len() as f64
        };

        tracing::info!(
            fragments = ids.len(),
            terms = postings.len(),
            avg_len,
            "BM25 index built"
        );
        Self { params, segmenter, ids, doc_lens, avg_len, postings }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.ids.len() as f64;
        let df = self.postings.get(term).map_or(0.0, |p| p.len() as f64);
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn query_terms(&self, query: &str) -> Vec<String> {
        let bounded = truncate_chars(query, QUERY_TOKENIZE_CAP);
        let (tokens, degraded) =
            segment_bounded(self.segmenter.as_ref(), bounded, QUERY_TOKENIZE_CAP);
        if degraded {
            tracing::warn!("query tokenized with fallback tokens");
        }
        // Unique terms only; repeating a term in the query does not multiply
        // its contribution.
        let mut unique = Vec::new();
        for token in tokens {
            if !unique.contains(&token) {
                unique.push(token);
            }
        }
        unique
    }

    fn scores_for(&self, terms: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.ids.len()];
        for term in terms {
            let Some(posting) = self.postings.get(term) else { continue };
            let idf = self.idf(term);
            for &(pos, tf) in posting {
                let tf = f64::from(tf);
                let doc_len = self.doc_lens[pos as usize] as f64;
                let norm = 1.0 - self.params.b + self.params.b * (doc_len / self.avg_len);
                scores[pos as usize] +=
                    idf * (tf * (self.params.k1 + 1.0)) / (tf + self.params.k1 * norm);
            }
        }
        scores
    }

    /// BM25 score of one fragment for one query; 0.0 for unknown ids.
    pub fn score(&self, query: &str, fragment_id: &str) -> f64 {
        let Some(pos) = self.ids.iter().position(|id| id == fragment_id) else {
            return 0.0;
        };
        self.scores_for(&self.query_terms(query))[pos]
    }

    /// Top-k fragments by score, ties broken by stable original order.
    pub fn search(&self, query: &str, k: usize) -> Vec<ChannelHit> {
        if self.ids.is_empty() || k == 0 {
            return vec![];
        }
        let scores = self.scores_for(&self.query_terms(query));
        let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
            .into_iter()
            .take(k)
            .map(|(pos, score)| ChannelHit {
                id: self.ids[pos].clone(),
                score,
                channel: Channel::Lexical,
            })
            .collect()
    }

    pub fn stats(&self) -> LexicalStats {
        let df = self
            .postings
            .iter()
            .map(|(token, posting)| (token.clone(), posting.len() as u32))
            .collect();
        LexicalStats { fragment_count: self.ids.len(), avg_len: self.avg_len, df }
    }
}
