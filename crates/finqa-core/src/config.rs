//! Lightweight configuration loader and typed retrieval settings.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env
//! vars. Every typed section implements `Default` with the tuned values, so
//! the whole pipeline runs with no config file present at all.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Extract a typed section, falling back to its defaults when the key is
    /// absent or malformed.
    pub fn section_or_default<T>(&self, key: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        self.figment.extract_inner(key).unwrap_or_default()
    }
}

/// Knowledge chunker settings. Sizes count chars.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    pub min_fragment_len: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self { chunk_size: 500, overlap: 150, min_fragment_len: 200 }
    }
}

/// Query-path settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Semantic similarity floor; semantic-only hits below it are dropped.
    pub similarity_threshold: f64,
    /// Returned fragment content is truncated to this many chars.
    pub max_content_len: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3, similarity_threshold: 0.5, max_content_len: 1_500 }
    }
}

/// Channel fusion weights.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub bm25_weight: f64,
    pub semantic_weight: f64,
    /// Per-keyword additive boost applied by the detail plan.
    pub keyword_boost_weight: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self { bm25_weight: 0.3, semantic_weight: 0.7, keyword_boost_weight: 0.15 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. If `p` is absolute, it's returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let chunker = ChunkerConfig::default();
        assert_eq!(chunker.chunk_size, 500);
        assert_eq!(chunker.overlap, 150);
        assert_eq!(chunker.min_fragment_len, 200);

        let retrieval = RetrievalConfig::default();
        assert_eq!(retrieval.top_k, 3);
        assert!((retrieval.similarity_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(retrieval.max_content_len, 1_500);

        let fusion = FusionConfig::default();
        assert!((fusion.bm25_weight + fusion.semantic_weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn resolve_with_base_keeps_absolute_paths() {
        let base = Path::new("/data");
        assert_eq!(resolve_with_base(base, "/tmp/x"), PathBuf::from("/tmp/x"));
        assert_eq!(resolve_with_base(base, "snapshots"), PathBuf::from("/data/snapshots"));
    }
}
