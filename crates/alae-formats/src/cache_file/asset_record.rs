//! Asset records
//!
//! ```text
//! name        short string
//! size        u64
//! time        u64
//! chunk list  container chunk, tag 0x0F01
//!   entry     chunk header (chunk tag, payload length)
//!             offset u32, size u32, name short string
//! ```
//!
//! Inputs are not part of the record; they come back through the
//! dependency records.

use std::io::{Read, Seek, Write};

use binrw::meta::{EndianKind, ReadEndian, WriteEndian};
use binrw::{BinRead, BinResult, BinWrite, Endian};

use super::error::CacheFileError;
use super::short_string::{read_short_string, short_string_len, write_short_string};
use crate::w3d::{Asset, CHUNK_HEADER_SIZE, CONTAINER_FLAG, Chunk, ChunkHeader};

/// Tag of the container holding an asset's chunk entries
pub const CHUNK_LIST_TAG: u32 = 0x0000_0F01;

/// Fixed part of a chunk entry payload: offset and size
const ENTRY_FIXED_LEN: usize = 8;

fn entry_payload_len(chunk: &Chunk) -> usize {
    ENTRY_FIXED_LEN + short_string_len(chunk.name_str())
}

fn malformed(reason: String, pos: u64) -> binrw::Error {
    CacheFileError::MalformedChunkList(reason).at(pos)
}

impl BinRead for Asset {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let name = read_short_string(reader)?;
        let size = u64::read_le(reader)?;
        let time = u64::read_le(reader)?;

        let list_pos = reader.stream_position()?;
        let list = ChunkHeader::read(reader)?;
        if list.tag != CHUNK_LIST_TAG || !list.is_container() {
            return Err(malformed(
                format!("asset {name}: expected chunk list, found tag 0x{:04X}", list.tag),
                list_pos,
            ));
        }
        let end = list_pos + CHUNK_HEADER_SIZE + u64::from(list.payload_len());

        let mut chunks = Vec::new();
        while reader.stream_position()? < end {
            chunks.push(read_entry(reader, end)?);
        }

        Ok(Self::new(name, size, time, chunks))
    }
}

fn read_entry<R: Read + Seek>(reader: &mut R, end: u64) -> BinResult<Chunk> {
    let pos = reader.stream_position()?;
    let header = ChunkHeader::read(reader)?;
    let entry_end = pos + CHUNK_HEADER_SIZE + u64::from(header.payload_len());
    if entry_end > end {
        return Err(malformed(
            format!("entry at {pos} ends at {entry_end}, beyond the list end {end}"),
            pos,
        ));
    }

    let offset = u32::read_le(reader)?;
    let size = u32::read_le(reader)?;
    let name = read_short_string(reader)?;

    let consumed = reader.stream_position()?;
    if consumed != entry_end {
        return Err(malformed(
            format!("entry at {pos} declares end {entry_end} but holds {consumed}"),
            pos,
        ));
    }

    let name = (!name.is_empty()).then_some(name);
    Ok(Chunk::new(header.chunk_tag(), name, offset, size))
}

impl BinWrite for Asset {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        write_short_string(writer, &self.name)?;
        self.size.write_le(writer)?;
        self.time.write_le(writer)?;

        let list_len: usize = self
            .chunks
            .iter()
            .map(|chunk| CHUNK_HEADER_SIZE as usize + entry_payload_len(chunk))
            .sum();
        let list_len = u32::try_from(list_len)
            .ok()
            .filter(|len| len & CONTAINER_FLAG == 0)
            .ok_or_else(|| {
                let pos = writer.stream_position().unwrap_or(0);
                CacheFileError::TooManyEntries {
                    what: "chunk list bytes",
                    count: list_len,
                }
                .at(pos)
            })?;
        ChunkHeader::new(CHUNK_LIST_TAG, list_len, true).write(writer)?;

        for chunk in &self.chunks {
            // Bounded by the list length check above
            let entry_len = entry_payload_len(chunk) as u32;
            ChunkHeader::new(chunk.tag.raw(), entry_len, false).write(writer)?;
            chunk.offset.write_le(writer)?;
            chunk.size.write_le(writer)?;
            write_short_string(writer, chunk.name_str())?;
        }

        Ok(())
    }
}

impl ReadEndian for Asset {
    const ENDIAN: EndianKind = EndianKind::Endian(Endian::Little);
}

impl WriteEndian for Asset {
    const ENDIAN: EndianKind = EndianKind::Endian(Endian::Little);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::w3d::{ChunkTag, ChunkType};
    use binrw::io::Cursor;
    use binrw::{BinReaderExt, BinWriterExt};
    use pretty_assertions::assert_eq;

    fn encode(asset: &Asset) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        buffer.write_le(asset).expect("Operation should succeed");
        buffer.into_inner()
    }

    #[test]
    fn test_record_layout() {
        let asset = Asset::texture("a.tga", 5, 9);
        let bytes = encode(&asset);

        let mut expected = vec![5];
        expected.extend_from_slice(b"a.tga");
        expected.extend_from_slice(&5u64.to_le_bytes());
        expected.extend_from_slice(&9u64.to_le_bytes());
        // List: one entry of 8 + 8 + 6 bytes
        expected.extend_from_slice(&[0x01, 0x0F, 0, 0, 22, 0, 0, 0x80]);
        expected.extend_from_slice(&[0x00, 0x0F, 0, 0, 14, 0, 0, 0]);
        expected.extend_from_slice(&0u32.to_le_bytes());
        expected.extend_from_slice(&5u32.to_le_bytes());
        expected.push(5);
        expected.extend_from_slice(b"a.tga");

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_record_round_trip_drops_inputs() {
        let mesh = Chunk::new(ChunkType::Mesh.into(), Some("tank.body".into()), 0, 100)
            .with_inputs(vec!["tank.tga".into()]);
        let hlod = Chunk::new(ChunkType::HLod.into(), Some("tank".into()), 108, 40);
        let asset = Asset::new("tank.w3d", 156, 1_700_000_000, vec![mesh, hlod]);

        let bytes = encode(&asset);
        let parsed: Asset = Cursor::new(&bytes)
            .read_le()
            .expect("Operation should succeed");

        assert_eq!(parsed.name, asset.name);
        assert_eq!(parsed.size, asset.size);
        assert_eq!(parsed.time, asset.time);
        assert_eq!(parsed.chunks.len(), 2);
        assert_eq!(parsed.chunks[0].tag, ChunkTag::Known(ChunkType::Mesh));
        assert_eq!(parsed.chunks[0].name_str(), "tank.body");
        assert!(parsed.chunks[0].inputs().is_empty());
        assert_eq!(parsed.chunks[1].offset, 108);
        assert_eq!(parsed.chunks[1].size, 40);
    }

    #[test]
    fn test_records_are_back_to_back() {
        let first = Asset::texture("a.tga", 1, 1);
        let second = Asset::new("empty.w3d", 0, 2, Vec::new());

        let mut buffer = Cursor::new(Vec::new());
        buffer.write_le(&first).expect("Operation should succeed");
        buffer.write_le(&second).expect("Operation should succeed");
        buffer.set_position(0);

        let a: Asset = buffer.read_le().expect("Operation should succeed");
        let b: Asset = buffer.read_le().expect("Operation should succeed");
        assert_eq!(a, first);
        assert_eq!(b, second);
    }

    #[test]
    fn test_wrong_list_tag() {
        let mut bytes = encode(&Asset::texture("a.tga", 5, 9));
        // List tag follows name (6) + size (8) + time (8)
        bytes[22] = 0x02;

        let err = Cursor::new(&bytes)
            .read_le::<Asset>()
            .expect_err("Operation should fail");
        assert!(matches!(
            err.custom_err::<CacheFileError>(),
            Some(CacheFileError::MalformedChunkList(_))
        ));
    }

    #[test]
    fn test_entry_overrunning_list() {
        let mut bytes = encode(&Asset::texture("a.tga", 5, 9));
        // Entry length byte
        bytes[34] = 40;

        let err = Cursor::new(&bytes)
            .read_le::<Asset>()
            .expect_err("Operation should fail");
        assert!(matches!(
            err.custom_err::<CacheFileError>(),
            Some(CacheFileError::MalformedChunkList(_))
        ));
    }

    #[test]
    fn test_truncated_record() {
        let bytes = encode(&Asset::texture("a.tga", 5, 9));
        assert!(Cursor::new(&bytes[..bytes.len() - 2])
            .read_le::<Asset>()
            .is_err());
    }
}
