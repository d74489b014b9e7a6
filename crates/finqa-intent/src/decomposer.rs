//! Question → `QueryIntent`: normalize, classify, extract, decompose.

use std::sync::Arc;

use finqa_core::entities::entities_by_kind;
use finqa_core::segment::salience_keywords;
use finqa_core::text::char_len;
use finqa_core::traits::Segmenter;
use finqa_core::types::{Intent, QueryIntent, SubIntent};

use crate::rules::{
    COMPARISON_RULES, CONNECTORS, FILLER, INTENT_TRIGGERS, MODAL_MARKERS, MODAL_STRIP,
    PART_TRIM, SUBJECT_STRIP,
};

/// Questions longer than this bypass trigger scoring entirely.
const LONG_TEXT_THRESHOLD: usize = 100;

/// Sub-query parts shorter than this are noise from splitting and dropped.
const MIN_PART_CHARS: usize = 5;

const MAX_KEYWORDS: usize = 5;
const MULTI_HOP_KEYWORDS: usize = 3;

/// Stateless per-request decomposer; safe to share across concurrent calls.
pub struct Decomposer {
    segmenter: Arc<dyn Segmenter>,
}

impl Decomposer {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self { segmenter }
    }

    /// Decompose a question. Guaranteed to return at least one sub-query,
    /// with `sub_intents` the same length as `decomposed_queries`.
    pub fn decompose(&self, question: &str) -> QueryIntent {
        let cleaned = normalize(question);
        let main_intent = classify(&cleaned);
        let entities = entities_by_kind(&cleaned);
        let keywords = salience_keywords(self.segmenter.as_ref(), &cleaned, MAX_KEYWORDS);

        let (mut sub_intents, mut queries) = match main_intent {
            Intent::MultiIntent => decompose_multi_intent(&cleaned),
            Intent::Reasoning => decompose_reasoning(&cleaned),
            Intent::MultiHop => decompose_multi_hop(&cleaned, &keywords),
            Intent::Summary => decompose_summary(&cleaned, &keywords),
            Intent::Comparison => decompose_comparison(&cleaned),
            Intent::Detail | Intent::LongText => decompose_detail(&cleaned, &keywords),
        };

        if queries.is_empty() {
            queries = vec![cleaned.clone()];
            sub_intents = vec![main_as_sub(main_intent)];
        }
        debug_assert_eq!(sub_intents.len(), queries.len());

        tracing::info!(
            intent = ?main_intent,
            sub_queries = queries.len(),
            "question decomposed"
        );
        tracing::debug!(?queries, "decomposition detail");

        QueryIntent {
            main_intent,
            sub_intents,
            entities,
            keywords,
            decomposed_queries: queries,
            original_question: question.to_string(),
        }
    }
}

/// Strip filler interjections, unify punctuation variants, collapse
/// whitespace.
fn normalize(question: &str) -> String {
    let stripped = FILLER.replace_all(question, "");
    let unified = stripped.replace('？', "?").replace('！', "!");
    unified.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Score every category by trigger hits; highest wins, ties resolve by table
/// order. Zero hits everywhere defaults to Detail; over-long questions are
/// LongText before any scoring.
fn classify(question: &str) -> Intent {
    if char_len(question) > LONG_TEXT_THRESHOLD {
        return Intent::LongText;
    }

    let mut best = Intent::Detail;
    let mut best_score = 0usize;
    for (intent, triggers) in INTENT_TRIGGERS {
        let score = triggers.iter().filter(|t| question.contains(*t)).count();
        if score > best_score {
            best = *intent;
            best_score = score;
        }
    }
    best
}

fn decompose_multi_intent(question: &str) -> (Vec<SubIntent>, Vec<String>) {
    let mut parts = vec![question.to_string()];
    for connector in CONNECTORS {
        parts = parts
            .iter()
            .flat_map(|p| p.split(connector))
            .map(str::to_string)
            .collect();
    }

    let queries: Vec<String> = parts
        .iter()
        .map(|p| p.trim_matches(PART_TRIM).to_string())
        .filter(|p| char_len(p) >= MIN_PART_CHARS)
        .collect();

    if queries.len() < 2 {
        // Connector was incidental; treat as one query.
        return (vec![SubIntent::MultiIntent], vec![question.to_string()]);
    }
    let subs = vec![SubIntent::Detail; queries.len()];
    (subs, queries)
}

fn decompose_reasoning(question: &str) -> (Vec<SubIntent>, Vec<String>) {
    if !MODAL_MARKERS.iter().any(|m| question.contains(m)) {
        return (vec![SubIntent::Reasoning], vec![question.to_string()]);
    }
    // Requirements query: the topic with modal/subject words stripped,
    // steered toward rule-stating fragments.
    let core = MODAL_STRIP.replace_all(question, "");
    let core = SUBJECT_STRIP.replace_all(&core, "");
    let rule_query = format!("{} 条件 标准 要求", core.trim());
    (
        vec![SubIntent::Rule, SubIntent::Reasoning],
        vec![rule_query, question.to_string()],
    )
}

fn decompose_multi_hop(question: &str, keywords: &[String]) -> (Vec<SubIntent>, Vec<String>) {
    let queries: Vec<String> = question
        .split(['，', '、'])
        .map(|p| p.trim().to_string())
        .filter(|p| char_len(p) >= MIN_PART_CHARS)
        .collect();

    if !queries.is_empty() {
        let subs = vec![SubIntent::Detail; queries.len()];
        return (subs, queries);
    }

    let mut queries = vec![question.to_string()];
    if !keywords.is_empty() {
        queries.push(keywords[..keywords.len().min(MULTI_HOP_KEYWORDS)].join(" "));
    }
    (vec![SubIntent::Detail; queries.len()], queries)
}

fn decompose_summary(question: &str, keywords: &[String]) -> (Vec<SubIntent>, Vec<String>) {
    let mut queries = vec![question.to_string()];
    if !keywords.is_empty() {
        queries.push(keywords.join(" "));
    }
    (vec![SubIntent::Summary; queries.len()], queries)
}

fn decompose_comparison(question: &str) -> (Vec<SubIntent>, Vec<String>) {
    for (rule, a, b) in COMPARISON_RULES.iter() {
        if let Some(caps) = rule.captures(question) {
            let x = caps.get(*a).map(|m| m.as_str().trim()).unwrap_or("");
            let y = caps.get(*b).map(|m| m.as_str().trim()).unwrap_or("");
            if !x.is_empty() && !y.is_empty() {
                return (
                    vec![SubIntent::Detail; 3],
                    vec![x.to_string(), y.to_string(), question.to_string()],
                );
            }
        }
    }
    (vec![SubIntent::Detail], vec![question.to_string()])
}

fn decompose_detail(question: &str, keywords: &[String]) -> (Vec<SubIntent>, Vec<String>) {
    let mut queries = vec![question.to_string()];
    if !keywords.is_empty() {
        let keyword_query = keywords.join(" ");
        if keyword_query != question {
            queries.push(keyword_query);
        }
    }
    (vec![SubIntent::Detail; queries.len()], queries)
}

fn main_as_sub(intent: Intent) -> SubIntent {
    match intent {
        Intent::Detail => SubIntent::Detail,
        Intent::MultiIntent => SubIntent::MultiIntent,
        Intent::Reasoning => SubIntent::Reasoning,
        Intent::MultiHop => SubIntent::MultiHop,
        Intent::Summary => SubIntent::Summary,
        Intent::Comparison => SubIntent::Comparison,
        Intent::LongText => SubIntent::LongText,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_filler_and_unifies_punctuation() {
        assert_eq!(normalize("这个 能办理 吗？"), "这个 能办理 ?");
        assert_eq!(normalize("怎么办呢！"), "怎么办!");
    }

    #[test]
    fn classify_defaults_to_detail() {
        assert_eq!(classify("网点营业时间"), Intent::Detail);
    }

    #[test]
    fn classify_length_gate_wins_over_triggers() {
        let long = format!("总结{}", "字".repeat(120));
        assert_eq!(classify(&long), Intent::LongText);
    }

    #[test]
    fn tie_breaks_follow_table_order() {
        // One summary hit, one comparison hit: summary outranks comparison.
        assert_eq!(classify("汇总两种卡的差异"), Intent::Summary);
    }
}
