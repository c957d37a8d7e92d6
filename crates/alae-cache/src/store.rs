//! Asset store: owns every asset and keeps the index in step

use std::fmt;

use alae_formats::{Asset, DependencyRecord};
use thiserror::Error;
use tracing::trace;

use crate::index::DependencyIndex;

/// Result of merging a scanned asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// New name, appended at this slot
    Added(usize),
    /// Newer copy replaced the asset at this slot
    Updated(usize),
    /// Existing asset at this slot was at least as fresh
    Kept(usize),
}

/// A dependency record that does not match the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    /// No asset with this name
    #[error("dependency record names unknown asset '{0}'")]
    UnknownAsset(String),
    /// The asset has no chunk with this name
    #[error("dependency record names unknown chunk '{chunk}' in asset '{asset}'")]
    UnknownChunk {
        /// Asset name
        asset: String,
        /// Chunk name
        chunk: String,
    },
}

/// An input name that does not resolve to any chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingInput {
    /// Asset owning the chunk
    pub asset: String,
    /// Chunk listing the input
    pub chunk: String,
    /// The unresolved name
    pub input: String,
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk {} in asset {} has an unresolved dependency: {};",
            self.chunk, self.asset, self.input
        )
    }
}

/// Every known asset, addressed by stable slot
#[derive(Debug, Default, Clone)]
pub struct AssetStore {
    assets: Vec<Asset>,
    index: DependencyIndex,
    chunks_with_inputs: usize,
}

impl AssetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset at a new slot
    pub fn push(&mut self, asset: Asset) -> usize {
        let slot = self.assets.len();
        self.index.insert_asset(slot, &asset);
        self.chunks_with_inputs += asset.chunks_with_inputs();
        self.assets.push(asset);
        slot
    }

    /// Replace the asset at `slot`, keeping the slot number
    pub fn replace(&mut self, slot: usize, mut asset: Asset) {
        let Some(current) = self.assets.get_mut(slot) else {
            return;
        };

        self.index.remove_asset(slot, current);
        self.chunks_with_inputs -= current.chunks_with_inputs();

        current.swap(&mut asset);

        self.index.insert_asset(slot, current);
        self.chunks_with_inputs += current.chunks_with_inputs();
    }

    /// Add a freshly decoded asset, or replace an older copy of it
    pub fn merge(&mut self, asset: Asset) -> MergeOutcome {
        match self.index.asset_slot(&asset.name) {
            None => MergeOutcome::Added(self.push(asset)),
            Some(slot) if asset.is_newer_than(&self.assets[slot]) => {
                trace!("Replacing {} at slot {}", asset.name, slot);
                self.replace(slot, asset);
                MergeOutcome::Updated(slot)
            }
            Some(slot) => MergeOutcome::Kept(slot),
        }
    }

    /// Restore the inputs of an imported chunk
    pub fn attach_inputs(&mut self, record: DependencyRecord) -> Result<(), AttachError> {
        let slot = self
            .index
            .asset_slot(&record.asset_name)
            .ok_or_else(|| AttachError::UnknownAsset(record.asset_name.clone()))?;
        let position = self
            .index
            .chunk_in_asset(slot, &record.chunk_name)
            .ok_or_else(|| AttachError::UnknownChunk {
                asset: record.asset_name.clone(),
                chunk: record.chunk_name.clone(),
            })?;

        let chunk = &mut self.assets[slot].chunks[position];
        let had_inputs = chunk.has_valid_inputs();
        chunk.set_inputs(record.inputs);

        match (had_inputs, chunk.has_valid_inputs()) {
            (false, true) => self.chunks_with_inputs += 1,
            (true, false) => self.chunks_with_inputs -= 1,
            _ => {}
        }
        Ok(())
    }

    /// Check every valid input against the chunk-name index
    ///
    /// With `invalidate`, each unresolved input is marked invalid and a
    /// chunk left without valid inputs stops counting towards the exported
    /// records.
    pub fn validate_inputs(&mut self, invalidate: bool) -> Vec<MissingInput> {
        let mut missing = Vec::new();

        for asset in &mut self.assets {
            for chunk in &mut asset.chunks {
                let had_inputs = chunk.has_valid_inputs();

                for i in 0..chunk.inputs().len() {
                    if !chunk.is_valid_input(i) {
                        continue;
                    }
                    if let Some(owner) = self.index.resolve(&chunk.inputs()[i]) {
                        trace!(
                            "{} resolves to chunk {} of asset {}",
                            chunk.inputs()[i],
                            owner.chunk,
                            owner.asset
                        );
                        continue;
                    }
                    missing.push(MissingInput {
                        asset: asset.name.clone(),
                        chunk: chunk.name_str().to_string(),
                        input: chunk.inputs()[i].clone(),
                    });
                    if invalidate {
                        chunk.invalidate_input(i);
                    }
                }

                if had_inputs && !chunk.has_valid_inputs() {
                    self.chunks_with_inputs -= 1;
                }
            }
        }

        missing
    }

    /// One record per chunk with valid inputs, in store order
    pub fn dependency_records(&self) -> Vec<DependencyRecord> {
        let records: Vec<DependencyRecord> = self
            .assets
            .iter()
            .flat_map(|asset| {
                asset
                    .chunks
                    .iter()
                    .filter(|chunk| chunk.has_valid_inputs())
                    .map(|chunk| {
                        DependencyRecord::new(
                            asset.name.clone(),
                            chunk.name_str(),
                            chunk.valid_inputs().map(str::to_string).collect(),
                        )
                    })
            })
            .collect();

        debug_assert_eq!(records.len(), self.chunks_with_inputs);
        records
    }

    /// Number of chunks with at least one valid input
    pub fn chunks_with_inputs(&self) -> usize {
        self.chunks_with_inputs
    }

    /// Assets in slot order
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Asset at `slot`
    pub fn get(&self, slot: usize) -> Option<&Asset> {
        self.assets.get(slot)
    }

    /// Asset by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&Asset> {
        self.index.asset_slot(name).and_then(|slot| self.get(slot))
    }

    /// The name index
    pub fn index(&self) -> &DependencyIndex {
        &self.index
    }

    /// Number of assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the store holds no assets
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
