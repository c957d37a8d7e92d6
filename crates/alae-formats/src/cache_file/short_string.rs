//! Length-prefixed strings: one length byte followed by the bytes

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, Endian};

use super::error::CacheFileError;

/// Longest string a one-byte prefix can describe
pub const SHORT_STRING_MAX: usize = u8::MAX as usize;

/// Read a short string
pub fn read_short_string<R: Read + Seek>(reader: &mut R) -> BinResult<String> {
    let len = u8::read_options(reader, Endian::Little, ())?;
    let mut bytes = vec![0u8; usize::from(len)];
    reader.read_exact(&mut bytes)?;

    String::from_utf8(bytes).map_err(|e| {
        let pos = reader.stream_position().unwrap_or(0);
        CacheFileError::from(e).at(pos)
    })
}

/// Write a short string
pub fn write_short_string<W: Write + Seek>(writer: &mut W, value: &str) -> BinResult<()> {
    let len = u8::try_from(value.len()).map_err(|_| {
        let pos = writer.stream_position().unwrap_or(0);
        CacheFileError::NameTooLong {
            name: value.to_string(),
            len: value.len(),
        }
        .at(pos)
    })?;

    writer.write_all(&[len])?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Encoded length of a short string
pub(crate) fn short_string_len(value: &str) -> usize {
    1 + value.len()
}
