//! Case-insensitive dependency index
//!
//! Three maps kept in lock-step with the asset store:
//!
//! - asset name to asset slot
//! - per asset slot, chunk name to chunk position
//! - chunk name to (asset slot, chunk position), across all assets
//!
//! Keys own a lower-cased copy of the name and values are plain slot
//! numbers, so the index never borrows from the store.

use std::collections::HashMap;

use alae_formats::Asset;

/// Case-folded lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    /// Fold a name into a key
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

}

/// Location of a chunk in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkSlot {
    /// Asset slot
    pub asset: usize,
    /// Position in the asset's chunk list
    pub chunk: usize,
}

/// Name lookups over the asset store
#[derive(Debug, Default, Clone)]
pub struct DependencyIndex {
    assets: HashMap<NameKey, usize>,
    asset_chunks: Vec<HashMap<NameKey, usize>>,
    chunks: HashMap<NameKey, ChunkSlot>,
}

impl DependencyIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `asset` at `slot`
    ///
    /// Chunk names already present elsewhere are taken over by this asset:
    /// the most recent insertion wins.
    pub fn insert_asset(&mut self, slot: usize, asset: &Asset) {
        self.assets.insert(NameKey::new(&asset.name), slot);

        if self.asset_chunks.len() <= slot {
            self.asset_chunks.resize_with(slot + 1, HashMap::new);
        }
        let local = &mut self.asset_chunks[slot];
        local.clear();

        for (position, chunk) in asset.chunks.iter().enumerate() {
            let Some(name) = chunk.name.as_deref() else {
                continue;
            };
            let key = NameKey::new(name);
            local.insert(key.clone(), position);
            self.chunks.insert(
                key,
                ChunkSlot {
                    asset: slot,
                    chunk: position,
                },
            );
        }
    }

    /// Drop every entry that points at `slot`, before `asset` (its current
    /// contents) is replaced
    ///
    /// Global chunk entries that another asset has since taken over are
    /// left alone.
    pub fn remove_asset(&mut self, slot: usize, asset: &Asset) {
        let key = NameKey::new(&asset.name);
        if self.assets.get(&key) == Some(&slot) {
            self.assets.remove(&key);
        }

        if let Some(local) = self.asset_chunks.get_mut(slot) {
            local.clear();
        }

        for name in asset.chunks.iter().filter_map(|chunk| chunk.name.as_deref()) {
            let key = NameKey::new(name);
            if self.chunks.get(&key).is_some_and(|found| found.asset == slot) {
                self.chunks.remove(&key);
            }
        }
    }

    /// Slot of the asset with this name
    pub fn asset_slot(&self, name: &str) -> Option<usize> {
        self.assets.get(&NameKey::new(name)).copied()
    }

    /// Position of a named chunk within one asset
    pub fn chunk_in_asset(&self, slot: usize, name: &str) -> Option<usize> {
        self.asset_chunks
            .get(slot)
            .and_then(|local| local.get(&NameKey::new(name)))
            .copied()
    }

    /// Owner of a chunk name, across all assets
    pub fn resolve(&self, name: &str) -> Option<ChunkSlot> {
        self.chunks.get(&NameKey::new(name)).copied()
    }

    /// Number of indexed assets
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Number of distinct chunk names
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}
