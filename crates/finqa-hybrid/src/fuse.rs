//! The shared fusion primitive: one query, both channels, one ranked list.

use std::collections::HashMap;

use finqa_core::config::{FusionConfig, RetrievalConfig};
use finqa_core::text::truncate_chars;
use finqa_core::types::{ChannelHit, FragmentId, RetrievalResult, SourceMeta};

use crate::build::KnowledgeIndex;
use crate::clean::clean_content;

/// Candidate pool pulled from each channel before fusion.
pub const CHANNEL_POOL: usize = 100;

/// Min-max normalize a channel's scores into [0,1], preserving order.
///
/// A constant-score channel carries no ranking signal of its own, so every
/// hit counts fully (all-1) and there is no divide-by-zero. Callers filter
/// zero-mass hits out beforehand, so "constant" always means constant
/// positive.
pub(crate) fn min_max_normalize(hits: &[ChannelHit]) -> Vec<(FragmentId, f64)> {
    if hits.is_empty() {
        return vec![];
    }
    let min = hits.iter().map(|h| h.score).fold(f64::INFINITY, f64::min);
    let max = hits.iter().map(|h| h.score).fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return hits.iter().map(|h| (h.id.clone(), 1.0)).collect();
    }
    hits.iter()
        .map(|h| (h.id.clone(), (h.score - min) / (max - min)))
        .collect()
}

/// Retrieve from both channels, normalize per channel, fuse over the id
/// union, and return the top-k joined back to cleaned fragment content.
///
/// Channel failures degrade: a semantic error leaves the lexical ranking in
/// force (and vice versa would too), never failing the call. An empty corpus
/// or a query missing both channels yields an empty list.
pub(crate) fn fuse(
    index: &KnowledgeIndex,
    fusion: &FusionConfig,
    retrieval: &RetrievalConfig,
    query: &str,
    k: usize,
) -> Vec<RetrievalResult> {
    if k == 0 || index.store.is_empty() {
        return vec![];
    }

    // Zero BM25 mass means no term overlap at all — not a hit.
    let lexical_hits: Vec<ChannelHit> = index
        .lexical
        .search(query, CHANNEL_POOL)
        .into_iter()
        .filter(|h| h.score > 0.0)
        .collect();

    // The similarity floor gates semantic-only contributions; lexical hits
    // are unaffected by it. Zero similarity is never a hit, whatever the
    // floor.
    let semantic_hits: Vec<ChannelHit> = match index.semantic.search(query, CHANNEL_POOL) {
        Ok(hits) => hits
            .into_iter()
            .filter(|h| h.score > 0.0 && h.score >= retrieval.similarity_threshold)
            .collect(),
        Err(e) => {
            tracing::warn!("semantic channel unavailable, degrading to lexical only: {e}");
            vec![]
        }
    };

    let lexical_norm = min_max_normalize(&lexical_hits);
    let semantic_norm = min_max_normalize(&semantic_hits);

    let lexical_by_id: HashMap<&str, f64> =
        lexical_norm.iter().map(|(id, s)| (id.as_str(), *s)).collect();
    let semantic_by_id: HashMap<&str, f64> =
        semantic_norm.iter().map(|(id, s)| (id.as_str(), *s)).collect();

    // Union in deterministic order: lexical ranking first, then semantic
    // hits not already present.
    let mut union: Vec<&FragmentId> = lexical_norm.iter().map(|(id, _)| id).collect();
    for (id, _) in &semantic_norm {
        if !lexical_by_id.contains_key(id.as_str()) {
            union.push(id);
        }
    }

    let mut fused: Vec<(FragmentId, f64, f64, f64)> = union
        .into_iter()
        .map(|id| {
            let lex = lexical_by_id.get(id.as_str()).copied().unwrap_or(0.0);
            let sem = semantic_by_id.get(id.as_str()).copied().unwrap_or(0.0);
            let total = fusion.bm25_weight * lex + fusion.semantic_weight * sem;
            (id.clone(), total, lex, sem)
        })
        .collect();
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    fused.truncate(k);

    fused
        .into_iter()
        .filter_map(|(id, total, lex, sem)| {
            let Some(fragment) = index.store.get(&id) else {
                tracing::warn!(%id, "channel hit missing from store");
                return None;
            };
            let cleaned = clean_content(&fragment.text);
            let content = truncate_chars(&cleaned, retrieval.max_content_len).to_string();
            Some(RetrievalResult {
                fragment_id: id,
                content,
                total_score: total,
                lexical_component: lex,
                semantic_component: sem,
                source: SourceMeta {
                    document_id: fragment.source_document_id.clone(),
                    title: fragment.source_title.clone(),
                    fragment_type: fragment.fragment_type,
                    ordinal: fragment.ordinal,
                },
                tag: None,
                compare_object: None,
                keyword_matches: None,
            })
        })
        .collect()
}
