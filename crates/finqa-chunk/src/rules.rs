//! Line classification rule table.
//!
//! Ordered data, not nested branching: a line is a heading if any heading
//! pattern matches, a table line if it carries table markers or enough
//! column separators, otherwise body text.

use std::sync::LazyLock;

use regex::Regex;

use finqa_core::text::char_len;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Table,
    Body,
}

static TITLE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 第一章 / 第二节 / 第三条 ...
        r"^第?[一二三四五六七八九十百千]+[章节条款项]",
        // 一、 二、 三、
        r"^[一二三四五六七八九十]+、",
        // 1. 2. 3.
        r"^\d+\.",
        // （一）（二）
        r"^（[一二三四五六七八九十]+）",
        // (一)(二)
        r"^\([一二三四五六七八九十]+\)",
        // 1) 2)
        r"^\d+\)\s",
        // 1）2）
        r"^\d+）",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Short heading-ish lines are promoted when they carry one of these words.
const TITLE_HINT_WORDS: &[&str] =
    &["概述", "简介", "说明", "流程", "步骤", "要求", "规定", "办法", "指南", "手册"];

const TITLE_HINT_MAX_CHARS: usize = 30;

const LINE_END_PUNCT: &[char] =
    &['。', '！', '？', '；', '.', '!', '?', ';', '，', ','];

/// Explicit markers left by the upstream table serializer.
const TABLE_MARKERS: &[&str] = &["[表格-", "[表-"];

/// Minimum `|` separators for a bare pipe-delimited table row.
const TABLE_MIN_PIPES: usize = 3;

pub fn classify_line(line: &str) -> LineKind {
    if is_title_line(line) {
        LineKind::Title
    } else if is_table_line(line) {
        LineKind::Table
    } else {
        LineKind::Body
    }
}

pub fn is_title_line(line: &str) -> bool {
    if TITLE_RULES.iter().any(|rule| rule.is_match(line)) {
        return true;
    }
    char_len(line) < TITLE_HINT_MAX_CHARS
        && !line.ends_with(LINE_END_PUNCT)
        && TITLE_HINT_WORDS.iter().any(|w| line.contains(w))
}

pub fn is_table_line(line: &str) -> bool {
    if TABLE_MARKERS.iter().any(|m| line.contains(m)) {
        return true;
    }
    line.matches('|').count() >= TABLE_MIN_PIPES
}
