//! Asset model: one decoded source file

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::debug;

use super::chunk::Chunk;
use super::chunk_type::{ChunkTag, ChunkType};
use super::decoder::{ChunkDecoder, MAX_NAME_LEN};
use super::error::{W3dError, W3dResult};

/// Accepted source extensions, sorted for binary search
pub const ACCEPTED_EXTENSIONS: [&str; 7] = ["dds", "jfif", "jpeg", "jpg", "png", "tga", "w3d"];

/// How a source file is turned into an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Decoded with the chunk decoder
    W3d,
    /// Opaque image, indexed as a single chunk
    Texture,
}

impl SourceKind {
    /// Classify a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.to_ascii_lowercase();
        ACCEPTED_EXTENSIONS
            .binary_search(&extension.as_str())
            .ok()
            .map(|_| {
                if extension == "w3d" {
                    Self::W3d
                } else {
                    Self::Texture
                }
            })
    }

    /// Classify a path by its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }
}

/// A source file's decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Lower-cased file name
    pub name: String,
    /// File length in bytes
    pub size: u64,
    /// Modification time, nanoseconds since the Unix epoch
    pub time: u64,
    /// Primary chunks in file order
    pub chunks: Vec<Chunk>,
}

impl Asset {
    /// Create an asset from its parts
    pub fn new(name: impl Into<String>, size: u64, time: u64, chunks: Vec<Chunk>) -> Self {
        Self {
            name: name.into(),
            size,
            time,
            chunks,
        }
    }

    /// Read and decode a source file
    pub fn from_file(path: &Path) -> W3dResult<Self> {
        let kind = SourceKind::from_path(path)
            .ok_or_else(|| W3dError::UnsupportedSource(path.display().to_string()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .ok_or_else(|| W3dError::UnsupportedSource(path.display().to_string()))?;
        if name.len() > MAX_NAME_LEN {
            return Err(W3dError::UnsupportedSource(format!(
                "{}: file name longer than {} bytes",
                path.display(),
                MAX_NAME_LEN
            )));
        }

        let metadata = fs::metadata(path)?;
        let size = metadata.len();
        let time = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
            });

        match kind {
            SourceKind::W3d => {
                let data = fs::read(path)?;
                let asset = Self::from_w3d_bytes(name, time, &data)?;
                debug!("Decoded {} with {} chunk(s)", asset.name, asset.chunks.len());
                Ok(asset)
            }
            SourceKind::Texture => Ok(Self::texture(name, size, time)),
        }
    }

    /// Decode an in-memory W3D file
    pub fn from_w3d_bytes(name: impl Into<String>, time: u64, data: &[u8]) -> W3dResult<Self> {
        let chunks = ChunkDecoder::decode_file(data)?;
        Ok(Self::new(name, data.len() as u64, time, chunks))
    }

    /// A texture asset: one chunk named after the file
    pub fn texture(name: impl Into<String>, size: u64, time: u64) -> Self {
        let name = name.into();
        let chunk = Chunk::new(
            ChunkTag::Known(ChunkType::TextureFile),
            Some(name.clone()),
            0,
            u32::try_from(size).unwrap_or(u32::MAX),
        );
        Self::new(name, size, time, vec![chunk])
    }

    /// Freshness: later modification time, or the same time with a
    /// different size. Equal time and size is not newer.
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.time > other.time || (self.time == other.time && self.size != other.size)
    }

    /// Exchange contents with another asset
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Number of chunks with at least one valid input
    pub fn chunks_with_inputs(&self) -> usize {
        self.chunks
            .iter()
            .filter(|chunk| chunk.has_valid_inputs())
            .count()
    }
}
