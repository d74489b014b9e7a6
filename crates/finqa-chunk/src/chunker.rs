//! Structure-aware chunking with size/overlap control.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use finqa_core::config::ChunkerConfig;
use finqa_core::entities::extract_entities;
use finqa_core::segment::salience_keywords;
use finqa_core::text::{char_len, contains_digit, tail_chars};
use finqa_core::traits::Segmenter;
use finqa_core::types::{Document, Fragment, FragmentType};

use crate::rules::{classify_line, LineKind};

/// Keywords attached to each fragment for retrieval boosting.
const FRAGMENT_KEYWORDS: usize = 10;

/// Sentence terminators the overlap walk snaps to.
const SENTENCE_ENDS: &[char] = &['。', '！', '？', '.', '!', '?'];

/// Words whose presence marks procedural, high-value content.
const PROCEDURAL_WORDS: &[&str] =
    &["流程", "步骤", "要求", "条件", "标准", "金额", "利率", "期限"];

const IMPORTANCE_CAP: f64 = 5.0;

static EXCESS_BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Splits document text into ordered, enriched [`Fragment`]s.
///
/// Line classification drives the splits: heading and table boundaries flush
/// the running buffer once it clears the size floor, and buffers that grow
/// past `chunk_size` are flushed with a sentence-snapped overlap carried into
/// the next fragment. Deterministic for a fixed config and segmenter.
pub struct Chunker {
    config: ChunkerConfig,
    segmenter: Arc<dyn Segmenter>,
}

impl Chunker {
    pub fn new(config: ChunkerConfig, segmenter: Arc<dyn Segmenter>) -> Self {
        Self { config, segmenter }
    }

    pub fn chunk_document(&self, document: &Document) -> Vec<Fragment> {
        self.chunk(&document.raw_text, &document.title, &document.id)
    }

    /// Chunk raw text. A document that never accumulates `min_fragment_len`
    /// chars yields no fragments at all — an ingestion gap the caller logs
    /// and skips, not a chunker failure.
    pub fn chunk(&self, text: &str, title: &str, doc_id: &str) -> Vec<Fragment> {
        let content = EXCESS_BLANK_LINES.replace_all(text, "\n\n");

        let mut fragments = Vec::new();
        let mut buffer = String::new();
        let mut section_title: Option<String> = None;
        let mut current_type = FragmentType::Paragraph;
        let mut ordinal = 0;

        for raw_line in content.split('\n') {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let kind = classify_line(line);

            // A structural boundary closes the running fragment, but only
            // once it clears the floor; thin content keeps accumulating
            // across the boundary instead of producing near-empty fragments.
            if kind != LineKind::Body
                && char_len(buffer.trim()) >= self.config.min_fragment_len
            {
                fragments.push(self.build_fragment(
                    &buffer,
                    title,
                    doc_id,
                    section_title.clone(),
                    current_type,
                    ordinal,
                ));
                ordinal += 1;
                buffer.clear();
            }

            match kind {
                LineKind::Title => {
                    section_title = Some(line.to_string());
                    current_type = FragmentType::TitleSection;
                }
                LineKind::Table => current_type = FragmentType::Table,
                LineKind::Body => current_type = FragmentType::Paragraph,
            }

            buffer.push_str(line);
            buffer.push('\n');

            if char_len(&buffer) >= self.config.chunk_size {
                fragments.push(self.build_fragment(
                    &buffer,
                    title,
                    doc_id,
                    section_title.clone(),
                    current_type,
                    ordinal,
                ));
                ordinal += 1;
                buffer = self.overlap_text(&buffer);
            }
        }

        if char_len(buffer.trim()) >= self.config.min_fragment_len {
            fragments.push(self.build_fragment(
                &buffer,
                title,
                doc_id,
                section_title,
                current_type,
                ordinal,
            ));
        }

        tracing::info!(doc = %title, fragments = fragments.len(), "document chunked");
        fragments
    }

    /// Trailing `overlap` chars of `text`, walked forward to the nearest
    /// sentence terminator so the carried-over text never starts
    /// mid-sentence. Raw tail when no terminator exists in the window.
    fn overlap_text(&self, text: &str) -> String {
        if char_len(text) <= self.config.overlap {
            return text.to_string();
        }
        let window = tail_chars(text, self.config.overlap);
        match window.find(SENTENCE_ENDS) {
            Some(idx) => {
                let end = idx + window[idx..].chars().next().map_or(0, char::len_utf8);
                window[end..].trim_start().to_string()
            }
            None => window.to_string(),
        }
    }

    fn build_fragment(
        &self,
        buffer: &str,
        title: &str,
        doc_id: &str,
        section_title: Option<String>,
        fragment_type: FragmentType,
        ordinal: usize,
    ) -> Fragment {
        let text = buffer.trim().to_string();
        let keywords = salience_keywords(self.segmenter.as_ref(), &text, FRAGMENT_KEYWORDS);
        let entities = extract_entities(&text);
        let importance_score = importance(&text, &keywords);
        let length = char_len(&text);

        Fragment {
            fragment_id: format!("{doc_id}:{ordinal}"),
            source_document_id: doc_id.to_string(),
            source_title: title.to_string(),
            section_title,
            text,
            fragment_type,
            ordinal,
            keywords,
            entities,
            importance_score,
            length,
        }
    }
}

/// Importance = keyword occurrence density, plus a flat bump for numeric
/// content, plus a bump per procedural word present. Capped at 5.0.
fn importance(content: &str, keywords: &[String]) -> f64 {
    let mut score = 0.0;

    let keyword_occurrences: usize =
        keywords.iter().map(|kw| content.matches(kw.as_str()).count()).sum();
    score += keyword_occurrences as f64 * 0.1;

    if contains_digit(content) {
        score += 0.5;
    }

    for word in PROCEDURAL_WORDS {
        if content.contains(word) {
            score += 0.3;
        }
    }

    score.min(IMPORTANCE_CAP)
}
