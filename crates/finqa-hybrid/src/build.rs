//! Offline index build and snapshot persistence.
//!
//! Single-writer, batch, write-once: the builder chunks documents into the
//! store, builds both channels, and hands back an immutable
//! [`KnowledgeIndex`]. Readers never observe a partial index — publication
//! happens atomically in [`HybridEngine::publish`](crate::engine::HybridEngine::publish).

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use finqa_chunk::Chunker;
use finqa_core::config::ChunkerConfig;
use finqa_core::error::{Error, Result};
use finqa_core::store::ChunkStore;
use finqa_core::traits::{Embedder, Segmenter};
use finqa_core::types::{Document, Fragment};
use finqa_lexical::{Bm25Index, Bm25Params, LexicalStats};
use finqa_semantic::SemanticChannel;

/// One fully built, immutable index: the fragment store plus both retrieval
/// channels. Shared read-only across concurrent query paths after publish.
pub struct KnowledgeIndex {
    pub(crate) store: ChunkStore,
    pub(crate) lexical: Bm25Index,
    pub(crate) semantic: SemanticChannel,
}

/// On-disk form: the fragment collection plus the lexical statistics needed
/// to verify a reload reproduces identical scores.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    fragments: Vec<Fragment>,
    bm25_params: Bm25Params,
    lexical_stats: LexicalStats,
}

impl KnowledgeIndex {
    /// Build both channels over an already-populated store.
    pub fn from_store(
        store: ChunkStore,
        segmenter: Arc<dyn Segmenter>,
        params: Bm25Params,
        mut semantic: SemanticChannel,
    ) -> Result<Self> {
        let lexical = Bm25Index::build(&store, segmenter, params);
        semantic.build(&store).map_err(|e| Error::ChannelUnavailable {
            channel: "semantic",
            reason: e.to_string(),
        })?;
        Ok(Self { store, lexical, semantic })
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn lexical_stats(&self) -> LexicalStats {
        self.lexical.stats()
    }

    /// Write the JSON snapshot: every fragment field plus lexical stats.
    pub fn save(&self, path: &Path) -> Result<()> {
        let snapshot = Snapshot {
            fragments: self.store.fragments().to_vec(),
            bm25_params: self.lexical.params(),
            lexical_stats: self.lexical.stats(),
        };
        fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
        tracing::info!(path = %path.display(), fragments = snapshot.fragments.len(), "snapshot saved");
        Ok(())
    }

    /// Restore a snapshot. Both channels are rebuilt deterministically from
    /// the persisted fragments; with the same segmenter the rebuilt lexical
    /// index reproduces the persisted stats — and therefore identical BM25
    /// scores. A mismatch means the segmenter changed underneath the
    /// snapshot and is reported loudly.
    pub fn load(
        path: &Path,
        segmenter: Arc<dyn Segmenter>,
        semantic: SemanticChannel,
    ) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_slice(&fs::read(path)?)?;
        let store = ChunkStore::from_fragments(snapshot.fragments);
        let index = Self::from_store(store, segmenter, snapshot.bm25_params, semantic)?;

        let rebuilt = index.lexical.stats();
        if rebuilt != snapshot.lexical_stats {
            tracing::warn!(
                path = %path.display(),
                "rebuilt lexical stats differ from snapshot; scores will not match the saved index"
            );
        }
        tracing::info!(path = %path.display(), fragments = index.store.len(), "snapshot loaded");
        Ok(index)
    }
}

/// Chunks documents and builds a [`KnowledgeIndex`]. Holds the explicit
/// service handles (segmenter, embedder) so nothing in the pipeline reaches
/// for hidden globals.
pub struct IndexBuilder {
    chunker: Chunker,
    segmenter: Arc<dyn Segmenter>,
    embedder: Arc<dyn Embedder>,
    params: Bm25Params,
}

impl IndexBuilder {
    pub fn new(
        chunker_config: ChunkerConfig,
        segmenter: Arc<dyn Segmenter>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let chunker = Chunker::new(chunker_config, Arc::clone(&segmenter));
        Self { chunker, segmenter, embedder, params: Bm25Params::default() }
    }

    pub fn with_bm25_params(mut self, params: Bm25Params) -> Self {
        self.params = params;
        self
    }

    /// Chunk every document and build both channels over the result.
    ///
    /// A document that yields no fragments is an ingestion gap: logged,
    /// skipped, never fatal to the batch.
    pub fn build(&self, documents: &[Document]) -> Result<KnowledgeIndex> {
        let mut store = ChunkStore::new();
        for document in documents {
            let fragments = self.chunker.chunk_document(document);
            if fragments.is_empty() {
                tracing::warn!(
                    doc = %document.id,
                    "{}",
                    Error::IngestionGap(document.id.clone())
                );
                continue;
            }
            store.extend(fragments);
        }
        tracing::info!(documents = documents.len(), fragments = store.len(), "corpus chunked");

        let semantic = SemanticChannel::in_process(Arc::clone(&self.embedder));
        self.build_with_channel(store, semantic)
    }

    /// Same build over a caller-provided semantic channel (external embedder
    /// and/or vector-index provider).
    pub fn build_with_channel(
        &self,
        store: ChunkStore,
        semantic: SemanticChannel,
    ) -> Result<KnowledgeIndex> {
        KnowledgeIndex::from_store(store, Arc::clone(&self.segmenter), self.params, semantic)
    }
}
