mod asset_record;
mod dependency_record;
mod error;
mod header;
mod short_string;

pub use asset_record::CHUNK_LIST_TAG;
pub use dependency_record::DependencyRecord;
pub use error::{CacheFileError, CacheFileResult};
pub use header::{CACHE_HEADER_SIZE, CACHE_MAGIC, CACHE_VERSION, CacheHeader, CacheTotals};
pub use short_string::{SHORT_STRING_MAX, read_short_string, write_short_string};
