//! Incremental ALAE asset cache builder
//!
//! An [`AssetCacher`] indexes every W3D and texture file under an asset
//! root, together with the cross-asset dependency names found inside the
//! W3D files, and persists the result as `asset.dat`.
//!
//! # Run phases
//!
//! 1. **Import** (incremental runs only): the previous cache is loaded. A
//!    missing or foreign cache file yields an empty store.
//! 2. **Scan**: every candidate file is decoded and merged. Newer copies
//!    replace older ones in place; files that fail to decode are skipped.
//! 3. **Validate**: every input name is resolved against the
//!    case-insensitive chunk-name index under the configured
//!    [`InputPolicy`].
//! 4. **Export**: the new cache is written atomically, after a best-effort
//!    backup of the previous one.
//!
//! # Example
//!
//! ```no_run
//! use alae_cache::{AssetCacher, CacherConfig, InputPolicy};
//!
//! # fn main() -> Result<(), alae_cache::CacheError> {
//! let config = CacherConfig::new("assets")
//!     .with_incremental(true)
//!     .with_input_policy(InputPolicy::Pedantic);
//! let summary = AssetCacher::new(config)?.run()?;
//! println!("{} assets cached", summary.exported_assets);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::uninlined_format_args)] // Matches the formats crate
#![allow(clippy::cast_lossless)] // Sometimes clearer than From

pub mod cacher;
pub mod config;
pub mod error;
pub mod index;
pub mod progress;
pub mod scan;
pub mod store;
pub mod warnings;

pub use cacher::{AssetCacher, CacherState, RunSummary};
pub use config::{CacherConfig, InputPolicy, Settings};
pub use error::{CacheError, CacheResult};
pub use index::{ChunkSlot, DependencyIndex, NameKey};
pub use progress::{Phase, ProgressReporter, SilentProgress};
pub use store::{AssetStore, AttachError, MergeOutcome, MissingInput};
pub use warnings::WarningsLog;
