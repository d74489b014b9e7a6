//! Per-intent retrieval plans over the fused candidate pool.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use finqa_core::config::{Config, FusionConfig, RetrievalConfig};
use finqa_core::error::{Error, Result};
use finqa_core::types::{Intent, QueryIntent, ResultTag, RetrievalResult};

use crate::build::KnowledgeIndex;
use crate::fuse::fuse;

/// Fragments stating a rule rather than describing a case carry one of
/// these words.
const RULE_WORDS: &[&str] = &["条件", "要求", "标准", "规定"];

/// Per-sub-query budget for the reasoning plan.
const REASONING_BUDGET: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub retrieval: RetrievalConfig,
    pub fusion: FusionConfig,
}

impl EngineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retrieval: config.section_or_default("retrieval"),
            fusion: config.section_or_default("fusion"),
        }
    }
}

/// The hybrid retrieval and ranking engine.
///
/// Holds no cross-request mutable state: publication is write-once and
/// atomic, and after it the index is shared read-only, so concurrent and
/// batched question answering is safe by construction.
pub struct HybridEngine {
    slot: OnceLock<Arc<KnowledgeIndex>>,
    config: EngineConfig,
}

impl HybridEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { slot: OnceLock::new(), config }
    }

    /// Atomically publish a built index. Fails on a second call — rebuilds
    /// go through a fresh engine.
    pub fn publish(&self, index: Arc<KnowledgeIndex>) -> Result<()> {
        self.slot.set(index).map_err(|_| Error::AlreadyPublished)
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    fn index(&self) -> Result<&KnowledgeIndex> {
        self.slot.get().map(|arc| arc.as_ref()).ok_or(Error::IndexNotBuilt)
    }

    /// [`retrieve`](Self::retrieve) with the configured default k.
    pub fn retrieve_default(&self, intent: &QueryIntent) -> Result<Vec<RetrievalResult>> {
        self.retrieve(intent, self.config.retrieval.top_k)
    }

    /// Run the intent's retrieval plan and return ranked, deduplicated
    /// results with score provenance.
    ///
    /// Errors only when no index is published; an empty return is a normal
    /// no-match outcome. The summary plan returns a wider set (up to 2k) for
    /// the downstream summarizer; every other plan returns at most k, with
    /// unique fragment ids everywhere except the comparison plan, where one
    /// fragment may legitimately support both compared objects.
    pub fn retrieve(&self, intent: &QueryIntent, k: usize) -> Result<Vec<RetrievalResult>> {
        let index = self.index()?;
        let results = match intent.main_intent {
            Intent::Detail | Intent::LongText => self.detail_plan(index, intent, k),
            Intent::MultiIntent => self.multi_intent_plan(index, intent, k),
            Intent::Reasoning => self.reasoning_plan(index, intent, k),
            Intent::MultiHop => self.multi_hop_plan(index, intent, k),
            Intent::Summary => self.summary_plan(index, intent, k),
            Intent::Comparison => self.comparison_plan(index, intent, k),
        };
        tracing::info!(
            intent = ?intent.main_intent,
            k,
            returned = results.len(),
            "retrieval plan finished"
        );
        Ok(results)
    }

    fn fuse(&self, index: &KnowledgeIndex, query: &str, k: usize) -> Vec<RetrievalResult> {
        fuse(index, &self.config.fusion, &self.config.retrieval, query, k)
    }

    /// Precise match plus keyword boost: over-fetch, reward literal keyword
    /// presence, re-rank.
    fn detail_plan(
        &self,
        index: &KnowledgeIndex,
        intent: &QueryIntent,
        k: usize,
    ) -> Vec<RetrievalResult> {
        let query = first_query(intent);
        let mut results = self.fuse(index, query, 2 * k);
        for result in &mut results {
            let matches =
                intent.keywords.iter().filter(|kw| result.content.contains(kw.as_str())).count();
            result.total_score += matches as f64 * self.config.fusion.keyword_boost_weight;
            result.keyword_matches = Some(matches);
        }
        sort_by_score(&mut results);
        results.truncate(k);
        results
    }

    /// One fused pass per sub-query, first-wins dedup, global re-rank.
    fn multi_intent_plan(
        &self,
        index: &KnowledgeIndex,
        intent: &QueryIntent,
        k: usize,
    ) -> Vec<RetrievalResult> {
        let queries = &intent.decomposed_queries;
        let budget = (k / queries.len().max(1)).max(2);
        let mut merged = Vec::new();
        let mut seen = HashSet::new();
        for query in queries {
            for result in self.fuse(index, query, budget) {
                if seen.insert(result.fragment_id.clone()) {
                    merged.push(result);
                }
            }
        }
        sort_by_score(&mut merged);
        merged.truncate(k);
        merged
    }

    /// Rules before cases: tag each hit, then rank rule-stating fragments
    /// ahead of equal-scoring case material.
    fn reasoning_plan(
        &self,
        index: &KnowledgeIndex,
        intent: &QueryIntent,
        k: usize,
    ) -> Vec<RetrievalResult> {
        let mut merged = Vec::new();
        let mut seen = HashSet::new();
        for query in &intent.decomposed_queries {
            for mut result in self.fuse(index, query, REASONING_BUDGET) {
                if !seen.insert(result.fragment_id.clone()) {
                    continue;
                }
                let is_rule = RULE_WORDS.iter().any(|w| result.content.contains(w));
                result.tag = Some(if is_rule { ResultTag::Rule } else { ResultTag::Case });
                merged.push(result);
            }
        }
        merged.sort_by(|a, b| {
            let a_rule = a.tag == Some(ResultTag::Rule);
            let b_rule = b.tag == Some(ResultTag::Rule);
            b_rule
                .cmp(&a_rule)
                .then_with(|| {
                    b.total_score
                        .partial_cmp(&a.total_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });
        merged.truncate(k);
        merged
    }

    /// Full-budget pass per hop, dedup by fragment id, rank by score.
    fn multi_hop_plan(
        &self,
        index: &KnowledgeIndex,
        intent: &QueryIntent,
        k: usize,
    ) -> Vec<RetrievalResult> {
        let mut merged = Vec::new();
        let mut seen = HashSet::new();
        for query in &intent.decomposed_queries {
            for result in self.fuse(index, query, k) {
                if seen.insert(result.fragment_id.clone()) {
                    merged.push(result);
                }
            }
        }
        sort_by_score(&mut merged);
        merged.truncate(k);
        merged
    }

    /// Broad recall for the summarizer: keyword query first, topped up from
    /// the full question while short of 2k.
    fn summary_plan(
        &self,
        index: &KnowledgeIndex,
        intent: &QueryIntent,
        k: usize,
    ) -> Vec<RetrievalResult> {
        let wide = 2 * k;
        let keyword_query = if intent.keywords.is_empty() {
            first_query(intent).to_string()
        } else {
            intent.keywords.join(" ")
        };

        let mut results = self.fuse(index, &keyword_query, wide);
        if results.len() < wide {
            let seen: HashSet<_> = results.iter().map(|r| r.fragment_id.clone()).collect();
            for result in self.fuse(index, first_query(intent), wide) {
                if results.len() >= wide {
                    break;
                }
                if !seen.contains(&result.fragment_id) {
                    results.push(result);
                }
            }
        }
        results
    }

    /// Balanced retrieval per compared object, tagged by originating object.
    /// No cross-object dedup: one fragment may support both sides.
    fn comparison_plan(
        &self,
        index: &KnowledgeIndex,
        intent: &QueryIntent,
        k: usize,
    ) -> Vec<RetrievalResult> {
        let queries = &intent.decomposed_queries;
        let budget = (k / queries.len().max(1)).max(1);
        let mut merged = Vec::new();
        for query in queries {
            for mut result in self.fuse(index, query, budget) {
                result.compare_object = Some(query.clone());
                merged.push(result);
            }
        }
        merged.truncate(k);
        merged
    }
}

fn first_query(intent: &QueryIntent) -> &str {
    intent
        .decomposed_queries
        .first()
        .map(String::as_str)
        .unwrap_or(&intent.original_question)
}

fn sort_by_score(results: &mut [RetrievalResult]) {
    results.sort_by(|a, b| {
        b.total_score.partial_cmp(&a.total_score).unwrap_or(std::cmp::Ordering::Equal)
    });
}
