//! finqa-intent
//!
//! Query understanding: classifies a question's structural shape, extracts
//! entities and salience keywords, and decomposes the question into the
//! sub-queries its retrieval plan will run. Intent decomposition beats
//! full-text matching.

pub mod decomposer;
pub mod rules;

pub use decomposer::Decomposer;
