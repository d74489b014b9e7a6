//! Layout-artifact cleanup for returned fragment content.
//!
//! Ingested text drags along page markers and hard-wrapped short lines from
//! the upstream format conversion; results read badly with them in place.

use std::sync::LazyLock;

use regex::Regex;

use finqa_core::text::char_len;

static PAGE_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"\[第?\s*\d+\s*页\s*\]", r"\[页\s*\d+-\d+\]", r"\[.*?-页\d+-\d+\]"]
        .into_iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Lines shorter than this that do not end a sentence get merged forward.
const SHORT_LINE_MAX: usize = 50;

const SENTENCE_END: &[char] = &['。', '！', '？', '：', '；', '.', '!', '?', ':', ';'];

/// A merge never swallows the start of a numbered section.
const HEADING_PREFIXES: &[&str] = &[
    "一、", "二、", "三、", "四、", "五、", "1.", "2.", "3.", "4.", "5.", "（一）", "（二）",
    "（三）", "第一", "第二",
];

/// Strip page markers, collapse blank runs and merge over-segmented short
/// lines. Idempotent on already-clean text.
pub fn clean_content(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let mut cleaned = content.to_string();
    for marker in PAGE_MARKERS.iter() {
        cleaned = marker.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = EXCESS_NEWLINES.replace_all(&cleaned, "\n\n");

    let lines: Vec<&str> = cleaned.split('\n').map(str::trim).collect();
    let mut merged: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() {
            merged.push(String::new());
            i += 1;
            continue;
        }
        if i + 1 < lines.len() {
            let next = lines[i + 1];
            if char_len(line) < SHORT_LINE_MAX
                && !next.is_empty()
                && !line.ends_with(SENTENCE_END)
                && !HEADING_PREFIXES.iter().any(|p| next.starts_with(p))
            {
                merged.push(format!("{line}{next}"));
                i += 2;
                continue;
            }
        }
        merged.push(line.to_string());
        i += 1;
    }

    merged.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_markers_are_stripped() {
        let cleaned = clean_content("申请流程如下。[第1页]\n提交材料。[页2-0]");
        assert!(!cleaned.contains("[第1页]"));
        assert!(!cleaned.contains("[页2-0]"));
        assert!(cleaned.contains("申请流程如下。"));
    }

    #[test]
    fn short_unterminated_lines_merge_forward() {
        let cleaned = clean_content("借款人应当提供\n收入证明与征信报告。");
        assert!(cleaned.contains("借款人应当提供收入证明与征信报告。"));
    }

    #[test]
    fn merges_never_swallow_headings() {
        let cleaned = clean_content("申请条件\n一、年满十八周岁。");
        assert_eq!(cleaned, "申请条件\n一、年满十八周岁。");
    }

    #[test]
    fn blank_runs_collapse() {
        let cleaned = clean_content("第一段。\n\n\n\n第二段。");
        assert_eq!(cleaned, "第一段。\n\n第二段。");
    }
}
