//! W3D chunk tags

use std::fmt;

/// Chunk tags the decoder understands
///
/// Only the tags that carry a name or a dependency reference, plus the
/// containers that lead to them, are modelled. Everything else decodes as
/// [`ChunkTag::Unrecognized`] and is skipped by its declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChunkType {
    /// Mesh container
    Mesh = 0x0000_0000,
    /// Mesh header, version 3
    MeshHeader3 = 0x0000_001F,
    /// Texture list of a mesh
    Textures = 0x0000_0030,
    /// Single texture description
    Texture = 0x0000_0031,
    /// Texture file name (NUL-terminated)
    TextureName = 0x0000_0032,

    /// Hierarchy (skeleton) container
    Hierarchy = 0x0000_0100,
    /// Hierarchy header
    HierarchyHeader = 0x0000_0101,

    /// Raw animation container
    Animation = 0x0000_0200,
    /// Raw animation header
    AnimationHeader = 0x0000_0201,

    /// Compressed animation container
    CompressedAnimation = 0x0000_0280,
    /// Compressed animation header
    CompressedAnimationHeader = 0x0000_0281,

    /// Morph animation container
    MorphAnimation = 0x0000_02C0,
    /// Morph animation header
    MorphAnimHeader = 0x0000_02C1,

    /// Particle emitter container
    Emitter = 0x0000_0500,
    /// Emitter header
    EmitterHeader = 0x0000_0501,
    /// Emitter parameters, including the texture file name
    EmitterInfo = 0x0000_0503,

    /// Aggregate container
    Aggregate = 0x0000_0600,
    /// Aggregate header
    AggregateHeader = 0x0000_0601,
    /// Aggregate contents: base model and attached sub-objects
    AggregateInfo = 0x0000_0602,

    /// Hierarchical LOD container
    HLod = 0x0000_0700,
    /// HLOD header
    HLodHeader = 0x0000_0701,
    /// One level of detail
    HLodLodArray = 0x0000_0702,
    /// Header of a sub-object array
    HLodSubObjectArrayHeader = 0x0000_0703,
    /// Render object bound to a bone
    HLodSubObject = 0x0000_0704,
    /// Aggregate objects of an HLOD
    HLodAggregateArray = 0x0000_0705,
    /// Proxy objects of an HLOD
    HLodProxyArray = 0x0000_0706,

    /// Collision box
    CollisionBox = 0x0000_0740,

    /// Stand-alone texture file (never found inside a W3D file)
    TextureFile = 0x0000_0F00,
}

impl ChunkType {
    /// Every modelled tag, in tag order
    pub const ALL: [ChunkType; 28] = [
        Self::Mesh,
        Self::MeshHeader3,
        Self::Textures,
        Self::Texture,
        Self::TextureName,
        Self::Hierarchy,
        Self::HierarchyHeader,
        Self::Animation,
        Self::AnimationHeader,
        Self::CompressedAnimation,
        Self::CompressedAnimationHeader,
        Self::MorphAnimation,
        Self::MorphAnimHeader,
        Self::Emitter,
        Self::EmitterHeader,
        Self::EmitterInfo,
        Self::Aggregate,
        Self::AggregateHeader,
        Self::AggregateInfo,
        Self::HLod,
        Self::HLodHeader,
        Self::HLodLodArray,
        Self::HLodSubObjectArrayHeader,
        Self::HLodSubObject,
        Self::HLodAggregateArray,
        Self::HLodProxyArray,
        Self::CollisionBox,
        Self::TextureFile,
    ];

    /// Look up a tag by its raw value
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.as_u32() == value)
    }

    /// Raw tag value as stored in the file
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Tag of a decoded chunk: a modelled [`ChunkType`] or a raw unknown value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkTag {
    /// A tag the decoder models
    Known(ChunkType),
    /// Any other tag, kept with its raw value
    Unrecognized(u32),
}

impl ChunkTag {
    /// Classify a raw tag value
    pub fn from_raw(value: u32) -> Self {
        ChunkType::from_u32(value).map_or(Self::Unrecognized(value), Self::Known)
    }

    /// Raw tag value
    pub const fn raw(self) -> u32 {
        match self {
            Self::Known(tag) => tag.as_u32(),
            Self::Unrecognized(value) => value,
        }
    }

    /// The modelled tag, if any
    pub const fn known(self) -> Option<ChunkType> {
        match self {
            Self::Known(tag) => Some(tag),
            Self::Unrecognized(_) => None,
        }
    }

    /// Whether this tag is the given modelled tag
    pub fn is(self, tag: ChunkType) -> bool {
        self == Self::Known(tag)
    }
}

impl From<ChunkType> for ChunkTag {
    fn from(tag: ChunkType) -> Self {
        Self::Known(tag)
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(tag) => write!(f, "{:?} (0x{:04X})", tag, tag.as_u32()),
            Self::Unrecognized(value) => write!(f, "0x{value:04X}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values_round_trip() {
        for tag in ChunkType::ALL {
            assert_eq!(ChunkType::from_u32(tag.as_u32()), Some(tag));
            assert_eq!(ChunkTag::from_raw(tag.as_u32()), ChunkTag::Known(tag));
        }
    }

    #[test]
    fn test_unknown_tags_keep_raw_value() {
        // Vertex normals: a real W3D tag the decoder does not model
        let tag = ChunkTag::from_raw(0x0000_0003);
        assert_eq!(tag, ChunkTag::Unrecognized(3));
        assert_eq!(tag.raw(), 3);
        assert!(tag.known().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(ChunkTag::Known(ChunkType::HLod).to_string(), "HLod (0x0700)");
        assert_eq!(ChunkTag::Unrecognized(0x1234).to_string(), "0x1234");
    }
}
