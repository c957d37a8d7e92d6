//! The W3D format is a sequence of tagged chunks. Every chunk starts with an
//! 8-byte header (tag and size word); containers hold further chunks in their
//! payload, leaves hold fixed structures. Only the structures that carry a
//! name or a reference to another asset's chunk are interpreted.
//!
//! ```text
//! Mesh (container)
//! ├── MeshHeader3         name: container.mesh
//! ├── Vertices            skipped
//! └── Textures (container)
//!     └── Texture (container)
//!         └── TextureName input: texture file name
//! ```

mod asset;
pub mod builder;
mod chunk;
mod chunk_type;
mod decoder;
mod error;
mod header;
mod rules;

pub use asset::{ACCEPTED_EXTENSIONS, Asset, SourceKind};
pub use chunk::Chunk;
pub use chunk_type::{ChunkTag, ChunkType};
pub use decoder::{ChunkDecoder, MAX_NAME_LEN, MAX_NESTING_DEPTH};
pub use error::{W3dError, W3dResult};
pub use header::{CHUNK_HEADER_SIZE, CONTAINER_FLAG, ChunkHeader};
