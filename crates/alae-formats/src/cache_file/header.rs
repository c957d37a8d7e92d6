//! Cache file header

use std::io::{Read, Seek};

use binrw::{BinRead, BinWrite};
use tracing::debug;

use super::error::CacheFileResult;

/// Cache file magic
pub const CACHE_MAGIC: [u8; 4] = *b"ALAE";

/// The only supported version tag (0x00000102 stored little-endian)
pub const CACHE_VERSION: [u8; 4] = [0x02, 0x01, 0x00, 0x00];

/// Size of the encoded header
pub const CACHE_HEADER_SIZE: usize = 16;

/// Record counts carried by the header
///
/// Stored as one little-endian `u64`: the asset count in the low half and
/// the dependency record count in the high half.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheTotals {
    /// Number of asset records
    pub asset_count: u32,
    /// Number of dependency records
    pub input_record_count: u32,
}

impl CacheTotals {
    /// Create totals from both counts
    pub const fn new(asset_count: u32, input_record_count: u32) -> Self {
        Self {
            asset_count,
            input_record_count,
        }
    }

    /// Split the packed field
    pub const fn from_packed(packed: u64) -> Self {
        Self {
            asset_count: (packed & 0xFFFF_FFFF) as u32,
            input_record_count: (packed >> 32) as u32,
        }
    }

    /// Pack both counts into the header field
    pub const fn packed(self) -> u64 {
        (self.asset_count as u64) | ((self.input_record_count as u64) << 32)
    }
}

/// Cache file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct CacheHeader {
    /// Magic bytes, `ALAE`
    pub magic: [u8; 4],
    /// Version tag
    pub version: [u8; 4],
    /// Packed [`CacheTotals`]
    pub totals: u64,
}

impl CacheHeader {
    /// Create a current-version header
    pub const fn new(totals: CacheTotals) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CACHE_VERSION,
            totals: totals.packed(),
        }
    }

    /// Whether magic and version match the supported format
    pub fn is_valid(&self) -> bool {
        self.magic == CACHE_MAGIC && self.version == CACHE_VERSION
    }

    /// Unpacked record counts
    pub const fn totals(&self) -> CacheTotals {
        CacheTotals::from_packed(self.totals)
    }

    /// Read the header and report the totals of a usable cache
    ///
    /// A short file, a foreign magic or an unknown version all yield
    /// `Ok(None)`: the caller starts from an empty cache. Only genuine I/O
    /// failures are errors.
    pub fn probe<R: Read + Seek>(reader: &mut R) -> CacheFileResult<Option<CacheTotals>> {
        let header = match Self::read(reader) {
            Ok(header) => header,
            Err(e) if e.is_eof() => {
                debug!("Cache file is shorter than its header");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if !header.is_valid() {
            debug!(
                "Cache header mismatch: magic {:?}, version {:?}",
                header.magic, header.version
            );
            return Ok(None);
        }

        Ok(Some(header.totals()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use binrw::BinWriterExt;
    use binrw::io::Cursor;
    use proptest::prelude::*;

    #[test]
    fn test_header_layout() {
        let header = CacheHeader::new(CacheTotals::new(3, 1));

        let mut buffer = Cursor::new(Vec::new());
        buffer.write_le(&header).expect("Operation should succeed");
        let bytes = buffer.into_inner();

        assert_eq!(bytes.len(), CACHE_HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"ALAE");
        assert_eq!(&bytes[4..8], &[0x02, 0x01, 0x00, 0x00]);
        assert_eq!(&bytes[8..16], &[3, 0, 0, 0, 1, 0, 0, 0]);

        let totals = CacheHeader::probe(&mut Cursor::new(&bytes)).expect("Operation should succeed");
        assert_eq!(totals, Some(CacheTotals::new(3, 1)));
    }

    #[test]
    fn test_bad_magic_is_not_an_error() {
        let mut bytes = b"ALAF".to_vec();
        bytes.extend_from_slice(&CACHE_VERSION);
        bytes.extend_from_slice(&[0u8; 8]);

        let totals = CacheHeader::probe(&mut Cursor::new(&bytes)).expect("Operation should succeed");
        assert_eq!(totals, None);
    }

    #[test]
    fn test_unknown_version_is_not_an_error() {
        let mut bytes = CACHE_MAGIC.to_vec();
        bytes.extend_from_slice(&[0x03, 0x01, 0x00, 0x00]);
        bytes.extend_from_slice(&[0u8; 8]);

        let totals = CacheHeader::probe(&mut Cursor::new(&bytes)).expect("Operation should succeed");
        assert_eq!(totals, None);
    }

    #[test]
    fn test_short_file_is_not_an_error() {
        let bytes = b"ALAE\x02\x01";
        let totals = CacheHeader::probe(&mut Cursor::new(&bytes)).expect("Operation should succeed");
        assert_eq!(totals, None);
    }

    proptest! {
        #[test]
        fn totals_pack_losslessly(assets in any::<u32>(), records in any::<u32>()) {
            let totals = CacheTotals::new(assets, records);
            prop_assert_eq!(CacheTotals::from_packed(totals.packed()), totals);
        }
    }
}
