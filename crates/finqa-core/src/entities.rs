//! Typed entity extraction over an ordered regex rule table.
//!
//! One table serves both the chunker (fragment enrichment at build time) and
//! the decomposer (question analysis at query time), so the two sides always
//! agree on what counts as an entity. The table is data, evaluated in order;
//! adding a kind means adding a row, not a branch.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Entity, EntityKind};

/// At most this many entities per kind.
pub const MAX_PER_KIND: usize = 5;
/// At most this many entities per extraction, across all kinds.
pub const MAX_TOTAL: usize = 20;

static ENTITY_RULES: LazyLock<Vec<(EntityKind, Regex)>> = LazyLock::new(|| {
    [
        (EntityKind::Money, r"\d+\.?\d*\s*[万亿千百]*元"),
        (EntityKind::Percentage, r"\d+\.?\d*\s*[%％]"),
        (EntityKind::Date, r"\d{4}\s*年\s*\d{1,2}\s*月|\d{4}\s*年"),
        (
            EntityKind::Product,
            r"理财产品|信用卡|信用贷款|住房贷款|贷款|理财|保险|基金|债券|股票|期货|存款",
        ),
        (
            EntityKind::Institution,
            r"中国[银行工商农业建设交通招商]银行|[工农中建交招商浦发民生兴业光大华夏平安]银行|太平洋保险|中国人寿",
        ),
        (EntityKind::Account, r"账户|账号|卡号|户名"),
        (EntityKind::Term, r"\d+\s*[年月日天周]"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

/// Extract typed entities from `text` in rule-table order.
///
/// Matches are deduplicated per kind and capped at [`MAX_PER_KIND`] each and
/// [`MAX_TOTAL`] overall; the caps keep fragment metadata bounded no matter
/// how entity-dense the input is.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let mut out = Vec::new();
    for (kind, rule) in ENTITY_RULES.iter() {
        let mut seen: Vec<&str> = Vec::new();
        for m in rule.find_iter(text) {
            let matched = m.as_str().trim();
            if matched.is_empty() || seen.contains(&matched) {
                continue;
            }
            seen.push(matched);
            out.push(Entity { kind: *kind, text: matched.to_string() });
            if seen.len() >= MAX_PER_KIND {
                break;
            }
        }
    }
    out.truncate(MAX_TOTAL);
    out
}

/// Same extraction, grouped by kind — the shape `QueryIntent` carries.
pub fn entities_by_kind(text: &str) -> BTreeMap<EntityKind, Vec<String>> {
    let mut grouped: BTreeMap<EntityKind, Vec<String>> = BTreeMap::new();
    for entity in extract_entities(text) {
        grouped.entry(entity.kind).or_default().push(entity.text);
    }
    grouped
}
