//! W3D file builder
//!
//! Produces minimal, structurally valid W3D files: each object carries the
//! header fields the decoder reads and zero padding for the rest. Used to
//! generate fixtures for decoder and cacher tests.

use super::chunk_type::ChunkType;
use super::header::ChunkHeader;
use super::rules::{W3D_LONG_NAME_LEN, W3D_NAME_LEN, W3D_PATH_LEN};

/// Mesh header version 4.2
const MESH_VERSION: u32 = 0x0004_0002;
/// Sizes of the fixed structures written by the builder
const MESH_HEADER3_SIZE: usize = 116;
const ANIMATION_HEADER_SIZE: usize = 44;
const EMITTER_INFO_SIZE: usize = 288;
const BOX_SIZE: usize = 72;

/// Builder for W3D files
#[derive(Debug, Clone, Default)]
pub struct W3dBuilder {
    chunks: Vec<Vec<u8>>,
}

impl W3dBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh named `qualifier.name` (or `name` when `qualifier` is
    /// empty) that references the given texture files
    pub fn mesh(mut self, qualifier: &str, name: &str, textures: &[&str]) -> Self {
        let mut header = Vec::with_capacity(MESH_HEADER3_SIZE);
        header.extend_from_slice(&MESH_VERSION.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes()); // attributes
        header.extend_from_slice(&fixed_name(name, W3D_NAME_LEN));
        header.extend_from_slice(&fixed_name(qualifier, W3D_NAME_LEN));
        header.resize(MESH_HEADER3_SIZE, 0);

        let mut children = vec![
            leaf(ChunkType::MeshHeader3.as_u32(), &header),
            // Vertices: skipped by the decoder
            leaf(0x0000_0002, &[0u8; 24]),
        ];

        if !textures.is_empty() {
            let list: Vec<Vec<u8>> = textures
                .iter()
                .map(|texture| {
                    let mut file_name = texture.as_bytes().to_vec();
                    file_name.push(0);
                    container(
                        ChunkType::Texture.as_u32(),
                        &[leaf(ChunkType::TextureName.as_u32(), &file_name)],
                    )
                })
                .collect();
            children.push(container(ChunkType::Textures.as_u32(), &list));
        }

        self.chunks
            .push(container(ChunkType::Mesh.as_u32(), &children));
        self
    }

    /// Add a hierarchy
    pub fn hierarchy(mut self, name: &str) -> Self {
        let mut header = vec![0u8; 4];
        header.extend_from_slice(&fixed_name(name, W3D_NAME_LEN));
        header.extend_from_slice(&0u32.to_le_bytes()); // pivot count
        header.extend_from_slice(&[0u8; 12]); // center

        self.chunks.push(container(
            ChunkType::Hierarchy.as_u32(),
            &[leaf(ChunkType::HierarchyHeader.as_u32(), &header)],
        ));
        self
    }

    /// Add a raw animation of `hierarchy`
    pub fn animation(mut self, hierarchy: &str, name: &str) -> Self {
        self.chunks.push(container(
            ChunkType::Animation.as_u32(),
            &[leaf(
                ChunkType::AnimationHeader.as_u32(),
                &animation_header(hierarchy, name),
            )],
        ));
        self
    }

    /// Add a compressed animation of `hierarchy`
    pub fn compressed_animation(mut self, hierarchy: &str, name: &str) -> Self {
        self.chunks.push(container(
            ChunkType::CompressedAnimation.as_u32(),
            &[leaf(
                ChunkType::CompressedAnimationHeader.as_u32(),
                &animation_header(hierarchy, name),
            )],
        ));
        self
    }

    /// Add a particle emitter drawing `texture`
    pub fn emitter(mut self, name: &str, texture: &str) -> Self {
        let mut header = vec![0u8; 4];
        header.extend_from_slice(&fixed_name(name, W3D_NAME_LEN));

        let mut info = fixed_name(texture, W3D_PATH_LEN);
        info.resize(EMITTER_INFO_SIZE, 0);

        self.chunks.push(container(
            ChunkType::Emitter.as_u32(),
            &[
                leaf(ChunkType::EmitterHeader.as_u32(), &header),
                leaf(ChunkType::EmitterInfo.as_u32(), &info),
            ],
        ));
        self
    }

    /// Add an aggregate built on `base_model` with attached sub-objects
    pub fn aggregate(mut self, name: &str, base_model: &str, sub_objects: &[&str]) -> Self {
        let mut header = vec![0u8; 4];
        header.extend_from_slice(&fixed_name(name, W3D_NAME_LEN));

        let mut info = fixed_name(base_model, W3D_LONG_NAME_LEN);
        info.extend_from_slice(&(sub_objects.len() as u32).to_le_bytes());
        for sub_object in sub_objects {
            info.extend_from_slice(&fixed_name(sub_object, W3D_LONG_NAME_LEN));
            info.extend_from_slice(&fixed_name("", W3D_LONG_NAME_LEN)); // bone
        }

        self.chunks.push(container(
            ChunkType::Aggregate.as_u32(),
            &[
                leaf(ChunkType::AggregateHeader.as_u32(), &header),
                leaf(ChunkType::AggregateInfo.as_u32(), &info),
            ],
        ));
        self
    }

    /// Add an HLOD over `hierarchy` with a single level of detail
    pub fn hlod(mut self, name: &str, hierarchy: &str, sub_objects: &[&str]) -> Self {
        let mut header = Vec::with_capacity(40);
        header.extend_from_slice(&0x0001_0000u32.to_le_bytes()); // version
        header.extend_from_slice(&1u32.to_le_bytes()); // lod count
        header.extend_from_slice(&fixed_name(name, W3D_NAME_LEN));
        header.extend_from_slice(&fixed_name(hierarchy, W3D_NAME_LEN));

        let mut array_header = (sub_objects.len() as u32).to_le_bytes().to_vec();
        array_header.extend_from_slice(&0f32.to_le_bytes()); // max screen size

        let mut lod = vec![leaf(
            ChunkType::HLodSubObjectArrayHeader.as_u32(),
            &array_header,
        )];
        for (bone, sub_object) in sub_objects.iter().enumerate() {
            let mut entry = (bone as u32).to_le_bytes().to_vec();
            entry.extend_from_slice(&fixed_name(sub_object, W3D_LONG_NAME_LEN));
            lod.push(leaf(ChunkType::HLodSubObject.as_u32(), &entry));
        }

        self.chunks.push(container(
            ChunkType::HLod.as_u32(),
            &[
                leaf(ChunkType::HLodHeader.as_u32(), &header),
                container(ChunkType::HLodLodArray.as_u32(), &lod),
            ],
        ));
        self
    }

    /// Add a collision box
    pub fn collision_box(mut self, name: &str) -> Self {
        let mut payload = vec![0u8; 8];
        payload.extend_from_slice(&fixed_name(name, W3D_LONG_NAME_LEN));
        payload.resize(BOX_SIZE, 0);

        self.chunks
            .push(leaf(ChunkType::CollisionBox.as_u32(), &payload));
        self
    }

    /// Add an arbitrary pre-encoded chunk
    pub fn raw(mut self, chunk: Vec<u8>) -> Self {
        self.chunks.push(chunk);
        self
    }

    /// Concatenate all top-level chunks
    pub fn build(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// Encode a leaf chunk
pub fn leaf(tag: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = ChunkHeader::new(tag, payload.len() as u32, false)
        .to_bytes()
        .to_vec();
    out.extend_from_slice(payload);
    out
}

/// Encode a container chunk from already encoded children
pub fn container(tag: u32, children: &[Vec<u8>]) -> Vec<u8> {
    let payload = children.concat();
    let mut out = ChunkHeader::new(tag, payload.len() as u32, true)
        .to_bytes()
        .to_vec();
    out.extend_from_slice(&payload);
    out
}

/// NUL-padded fixed-width name; longer names are cut to `len - 1` bytes
pub fn fixed_name(name: &str, len: usize) -> Vec<u8> {
    let mut out: Vec<u8> = name.bytes().take(len.saturating_sub(1)).collect();
    out.resize(len, 0);
    out
}

fn animation_header(hierarchy: &str, name: &str) -> Vec<u8> {
    let mut header = Vec::with_capacity(ANIMATION_HEADER_SIZE);
    header.extend_from_slice(&0x0004_0001u32.to_le_bytes()); // version
    header.extend_from_slice(&fixed_name(name, W3D_NAME_LEN));
    header.extend_from_slice(&fixed_name(hierarchy, W3D_NAME_LEN));
    header.extend_from_slice(&30u32.to_le_bytes()); // frame count
    header.extend_from_slice(&30u32.to_le_bytes()); // frame rate
    header
}
