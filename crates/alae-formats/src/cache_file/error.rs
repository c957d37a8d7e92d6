//! Cache file error types

use thiserror::Error;

/// Cache file codec error type
#[derive(Debug, Error)]
pub enum CacheFileError {
    /// A short string does not fit its one-byte length prefix
    #[error("name of {len} bytes does not fit a short string (max 255): {name}")]
    NameTooLong {
        /// The offending name
        name: String,
        /// Its length in bytes
        len: usize,
    },

    /// A dependency record has more inputs than its 16-bit count holds
    #[error("chunk {chunk} has {count} inputs, more than a record can hold")]
    TooManyInputs {
        /// Chunk owning the inputs
        chunk: String,
        /// Number of valid inputs
        count: usize,
    },

    /// A count does not fit its 32-bit header field
    #[error("too many {what}: {count}")]
    TooManyEntries {
        /// What was being counted
        what: &'static str,
        /// The count
        count: usize,
    },

    /// The chunk list of an asset record is not well formed
    #[error("malformed chunk list: {0}")]
    MalformedChunkList(String),

    /// A stored name is not valid UTF-8
    #[error("stored name is not valid UTF-8")]
    InvalidName(#[from] std::string::FromUtf8Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl CacheFileError {
    /// Wrap as a positioned `binrw` error
    pub(crate) fn at(self, pos: u64) -> binrw::Error {
        binrw::Error::Custom {
            pos,
            err: Box::new(self),
        }
    }
}

/// Result type for cache file operations
pub type CacheFileResult<T> = Result<T, CacheFileError>;
