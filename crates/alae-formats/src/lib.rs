//! W3D chunk decoding and the ALAE asset cache file format
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Many W3D-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::derive_partial_eq_without_eq)] // Binary format structs
#![allow(clippy::redundant_closure_for_method_calls)] // Iterator chains
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! This crate provides the two binary formats an asset cacher has to speak:
//!
//! - **W3D**: the tagged, nested chunk container used by 3D model, animation
//!   and effect assets. Only names and dependency references are extracted;
//!   geometry and material payloads are skipped.
//! - **ALAE cache file**: the persisted index of decoded assets together with
//!   the dependency records that survived validation.
//!
//! # Design Principles
//!
//! - **Forward Compatible**: unrecognized chunk tags are skipped by their
//!   declared length, never interpreted.
//! - **Table Driven**: the name and input rules for every recognized tag live
//!   in one table instead of one reader function per tag.
//! - **Symmetric Operations**: cache records are both read and written with
//!   `binrw`, and a W3D builder produces inputs for the decoder.

#![warn(missing_docs)]

/// ALAE cache file format (`asset.dat`)
///
/// The cache file starts with a fixed `ALAE` magic and a single supported
/// version tag, followed by every asset record and then every dependency
/// record. Header mismatches are reported as "no valid cache" rather than as
/// errors so that a stale or foreign file simply triggers a full rebuild.
pub mod cache_file;
/// W3D chunk format: tags, headers, the recursive decoder and the asset model
pub mod w3d;

pub use cache_file::{CacheFileError, CacheFileResult, CacheHeader, CacheTotals, DependencyRecord};
pub use w3d::{Asset, Chunk, ChunkTag, ChunkType, SourceKind, W3dError, W3dResult};
