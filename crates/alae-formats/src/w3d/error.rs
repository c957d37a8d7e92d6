//! W3D error types

use thiserror::Error;

use super::chunk_type::ChunkTag;

/// W3D decode error type
///
/// Every variant describes a structural problem with one source file. The
/// cacher reports these per file and moves on to the next one.
#[derive(Debug, Error)]
pub enum W3dError {
    /// The file contains no bytes at all
    #[error("empty W3D file")]
    EmptyFile,

    /// Not enough bytes left for a chunk header
    #[error("truncated chunk header at offset {offset}: {available} byte(s) left")]
    Truncated {
        /// Offset where the header should start
        offset: u64,
        /// Bytes remaining before the enclosing boundary
        available: u64,
    },

    /// A chunk declares more payload than its parent (or the file) holds
    #[error("chunk {tag} at offset {offset} ends at {end}, beyond its boundary {boundary}")]
    ChunkOverrun {
        /// Tag of the offending chunk
        tag: ChunkTag,
        /// Offset of the chunk header
        offset: u64,
        /// Declared end of the chunk payload
        end: u64,
        /// End of the enclosing chunk or file
        boundary: u64,
    },

    /// A fixed field lies outside the chunk payload
    #[error("field at {offset}..{end} is outside the {len}-byte payload of chunk {tag}")]
    FieldOutOfBounds {
        /// Tag of the chunk being read
        tag: ChunkTag,
        /// Field start within the payload
        offset: usize,
        /// Field end within the payload
        end: usize,
        /// Payload length
        len: usize,
    },

    /// A top-level chunk that must be named has no name
    #[error("chunk {tag} at offset {offset} has no name")]
    MissingName {
        /// Tag of the unnamed chunk
        tag: ChunkTag,
        /// Offset of the chunk header
        offset: u64,
    },

    /// Containers nest deeper than the decoder follows
    #[error("chunk {tag} at offset {offset} nests {depth} levels deep (max {max})")]
    TooDeep {
        /// Tag of the chunk past the limit
        tag: ChunkTag,
        /// Offset of the chunk header
        offset: u64,
        /// Nesting depth of the chunk
        depth: usize,
        /// Deepest nesting accepted
        max: usize,
    },

    /// A chunk or input name does not fit the cache's length-prefixed strings
    #[error("name of {len} bytes in chunk {tag} exceeds {max} bytes")]
    NameTooLong {
        /// Tag of the chunk carrying the name
        tag: ChunkTag,
        /// Name length in bytes
        len: usize,
        /// Longest name accepted
        max: usize,
    },

    /// The file has no extension the cacher knows how to read
    #[error("unsupported source file: {0}")]
    UnsupportedSource(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for W3D operations
pub type W3dResult<T> = Result<T, W3dError>;
