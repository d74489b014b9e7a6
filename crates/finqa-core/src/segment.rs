//! Bounded tokenization and salience keyword extraction.
//!
//! The real segmenter is an external collaborator behind the
//! [`Segmenter`](crate::traits::Segmenter) trait and may fail on pathological
//! input. Everything in the core goes through [`segment_bounded`], which caps
//! input length up front and degrades to a fixed punctuation split instead of
//! raising, so worst-case segmentation cost stays bounded at build time and
//! query time alike.

use std::collections::HashMap;

use crate::text::{char_len, truncate_chars};
use crate::traits::Segmenter;

/// Punctuation class used by the fallback split.
const SPLIT_PUNCT: &[char] = &[
    '，', '。', '！', '？', '；', '：', '、', '“', '”', '（', '）', '《', '》', ',', '.', '!',
    '?', ';', ':', '(', ')', '"', '|',
];

/// Input cap for keyword extraction, matching the fragment-side cap.
pub const SALIENCE_INPUT_CAP: usize = 5_000;

/// Tokens shorter than this never become keywords.
const MIN_KEYWORD_CHARS: usize = 2;

/// Function words excluded from salience ranking. The English half follows
/// the stopword list the lexical channel has always shipped; the Chinese half
/// covers particles and question scaffolding that carry no topical weight.
const STOPWORDS: &[&str] = &[
    // English
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it",
    "of", "on", "or", "that", "the", "to", "was", "will", "with", "this", "these", "they",
    "there", "then", "than", "what", "which", "who", "how", "can", "could", "should", "would",
    "do", "does", "did", "have", "had",
    // Chinese particles and connectives
    "的", "了", "在", "是", "我", "你", "他", "她", "它", "我们", "你们", "他们", "这", "那",
    "这个", "那个", "一个", "和", "与", "或", "及", "以及", "等", "对", "从", "将", "被", "把",
    "为", "于", "之", "其", "中", "也", "都", "很", "更", "最", "就", "还", "请问", "如果",
    "因为", "所以", "但是", "而且", "可以", "需要", "进行", "通过", "相关",
];

/// Default in-process segmenter: whitespace plus a fixed punctuation class.
/// Identical to the degraded path, which makes it fully deterministic — the
/// property every chunking and scoring test leans on.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> anyhow::Result<Vec<String>> {
        Ok(fallback_split(text))
    }
}

/// Split on whitespace and the fixed punctuation class. Never fails.
pub fn fallback_split(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || SPLIT_PUNCT.contains(&c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenize at most `max_chars` chars of `text` through `segmenter`.
///
/// Returns the tokens and a degraded flag: `true` means the segmenter failed
/// and the fallback split was used. Degradation is logged and never
/// propagates — retrieval proceeds on the coarser tokens.
pub fn segment_bounded(
    segmenter: &dyn Segmenter,
    text: &str,
    max_chars: usize,
) -> (Vec<String>, bool) {
    let bounded = truncate_chars(text, max_chars);
    if bounded.len() < text.len() {
        tracing::debug!(cap = max_chars, "input truncated before segmentation");
    }
    match segmenter.segment(bounded) {
        Ok(tokens) => (tokens, false),
        Err(e) => {
            tracing::warn!("segmentation failed, falling back to punctuation split: {e}");
            (fallback_split(bounded), true)
        }
    }
}

/// Extract up to `top_n` salience keywords from `text`.
///
/// Tokens are ranked by frequency; ties break toward earlier first
/// occurrence, so output order is deterministic for a fixed segmenter.
pub fn salience_keywords(segmenter: &dyn Segmenter, text: &str, top_n: usize) -> Vec<String> {
    let (tokens, _) = segment_bounded(segmenter, text, SALIENCE_INPUT_CAP);

    let mut stats: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, token) in tokens.into_iter().enumerate() {
        if !is_keyword_candidate(&token) {
            continue;
        }
        let entry = stats.entry(token).or_insert((0, pos));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = stats.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(top_n).map(|(t, _)| t).collect()
}

fn is_keyword_candidate(token: &str) -> bool {
    if char_len(token) < MIN_KEYWORD_CHARS {
        return false;
    }
    if STOPWORDS.contains(&token.to_lowercase().as_str()) {
        return false;
    }
    // Bare numbers and ASCII punctuation runs are entity material, not topics.
    !token
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_punctuation())
}
