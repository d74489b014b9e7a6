//! Intent trigger tables and decomposition patterns.
//!
//! The trigger table doubles as the tie-break order: when two categories
//! score the same number of hits, the earlier row wins. Detail sits last as
//! the default.

use std::sync::LazyLock;

use regex::Regex;

use finqa_core::types::Intent;

/// Ordered (category, trigger phrases) table. Row order IS the tie-break
/// priority: MultiIntent > Reasoning > MultiHop > Summary > Comparison >
/// Detail.
pub const INTENT_TRIGGERS: &[(Intent, &[&str])] = &[
    (Intent::MultiIntent, &["和", "以及", "还有", "另外", "同时", "并且"]),
    (Intent::Reasoning, &["是否", "能否", "可以", "符合", "满足", "达到", "合规", "允许"]),
    (Intent::MultiHop, &["然后", "接着", "之后", "导致", "影响", "基于", "根据"]),
    (Intent::Summary, &["总结", "归纳", "概述", "整体", "全部", "汇总", "综述"]),
    (Intent::Comparison, &["对比", "比较", "区别", "差异", "优劣"]),
    (Intent::Detail, &["什么", "哪些", "多少", "如何", "怎么", "怎样", "具体", "详细"]),
];

/// Connectors a multi-intent question is split on, iteratively.
pub const CONNECTORS: &[&str] = &["和", "以及", "还有", "另外", "同时", "并且", "及"];

/// Modal possibility markers that turn a reasoning question into a
/// requirements query + original question pair.
pub const MODAL_MARKERS: &[&str] = &["是否", "能否", "可以"];

/// Filler interjections stripped during normalization.
pub static FILLER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[呢吗啊哦嗯呀]").unwrap());

/// Modal and subject words stripped from the requirements query.
pub static MODAL_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"是否|能否|可以|吗").unwrap());
pub static SUBJECT_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"客户|我|用户").unwrap());

/// Compare-X-and-Y patterns, tried in order. The first two capture groups of
/// a successful match are the compared objects.
pub static COMPARISON_RULES: LazyLock<Vec<(Regex, usize, usize)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(.+)和(.+)的?(对比|比较|区别)").unwrap(), 1, 2),
        (Regex::new(r"(对比|比较)(.+)和(.+)").unwrap(), 2, 3),
    ]
});

/// Punctuation trimmed off split sub-query parts.
pub const PART_TRIM: &[char] = &['，', '。', '？', '！', '、', '?', '!', ',', ' '];
