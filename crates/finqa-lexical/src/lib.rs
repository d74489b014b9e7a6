//! finqa-lexical
//!
//! From-scratch BM25 over chunked fragments: inverted token postings,
//! closed-form scoring with document-length normalization, and bounded
//! tokenization that degrades instead of failing. Built once per index
//! build, immutable after publish.

pub mod bm25;

pub use bm25::{Bm25Index, Bm25Params, LexicalStats};
