//! W3D chunk header

use binrw::{BinRead, BinWrite};

use super::chunk_type::ChunkTag;

/// Size of a chunk header in bytes
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// Bit of the size word marking a chunk that contains sub-chunks
pub const CONTAINER_FLAG: u32 = 0x8000_0000;

/// Chunk header: tag followed by the size word
///
/// The low 31 bits of the size word are the payload length, not counting
/// the header itself. The top bit is set on containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ChunkHeader {
    /// Raw chunk tag
    pub tag: u32,
    /// Payload length plus the container flag
    pub size_word: u32,
}

impl ChunkHeader {
    /// Create a header for a payload of `payload_len` bytes
    pub const fn new(tag: u32, payload_len: u32, container: bool) -> Self {
        let flag = if container { CONTAINER_FLAG } else { 0 };
        Self {
            tag,
            size_word: (payload_len & !CONTAINER_FLAG) | flag,
        }
    }

    /// Declared payload length
    pub const fn payload_len(&self) -> u32 {
        self.size_word & !CONTAINER_FLAG
    }

    /// Whether the header claims sub-chunks
    pub const fn is_container(&self) -> bool {
        self.size_word & CONTAINER_FLAG != 0
    }

    /// Classified tag
    pub fn chunk_tag(&self) -> ChunkTag {
        ChunkTag::from_raw(self.tag)
    }

    /// Encoded header bytes
    pub fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&self.tag.to_le_bytes());
        bytes[4..].copy_from_slice(&self.size_word.to_le_bytes());
        bytes
    }
}
