//! Exclusive owner of all [`Fragment`]s produced by a build.
//!
//! The store is filled once by the index builder and read-only afterwards;
//! the lexical and semantic channels keep only fragment ids and join back
//! through [`ChunkStore::get`] at result-assembly time.

use std::collections::HashMap;

use crate::types::{Fragment, FragmentId};

#[derive(Debug, Default)]
pub struct ChunkStore {
    fragments: Vec<Fragment>,
    by_id: HashMap<FragmentId, usize>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        let mut store = Self::new();
        store.extend(fragments);
        store
    }

    /// Insert one fragment. A duplicate id is dropped with a warning — ids
    /// are `{document}:{ordinal}` and a collision means the same document was
    /// chunked twice into one build.
    pub fn insert(&mut self, fragment: Fragment) {
        if self.by_id.contains_key(&fragment.fragment_id) {
            tracing::warn!(id = %fragment.fragment_id, "duplicate fragment id dropped");
            return;
        }
        self.by_id.insert(fragment.fragment_id.clone(), self.fragments.len());
        self.fragments.push(fragment);
    }

    pub fn extend(&mut self, fragments: Vec<Fragment>) {
        for fragment in fragments {
            self.insert(fragment);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Fragment> {
        self.by_id.get(id).map(|&idx| &self.fragments[idx])
    }

    /// All fragments in insertion order — the stable order every channel and
    /// tie-break relies on.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
