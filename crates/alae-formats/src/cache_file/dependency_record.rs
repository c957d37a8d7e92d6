//! Dependency records: the surviving inputs of one chunk

use std::io::{Read, Seek, Write};

use binrw::meta::{EndianKind, ReadEndian, WriteEndian};
use binrw::{BinRead, BinResult, BinWrite, Endian};

use super::error::CacheFileError;
use super::short_string::{read_short_string, write_short_string};

/// Inputs of one chunk, addressed by asset and chunk name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Owning asset
    pub asset_name: String,
    /// Chunk within the asset
    pub chunk_name: String,
    /// Valid input names in original order
    pub inputs: Vec<String>,
}

impl DependencyRecord {
    /// Create a record
    pub fn new(
        asset_name: impl Into<String>,
        chunk_name: impl Into<String>,
        inputs: Vec<String>,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            chunk_name: chunk_name.into(),
            inputs,
        }
    }
}

impl BinRead for DependencyRecord {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let asset_name = read_short_string(reader)?;
        let chunk_name = read_short_string(reader)?;
        let count = u16::read_le(reader)?;

        let inputs = (0..count)
            .map(|_| read_short_string(reader))
            .collect::<BinResult<Vec<_>>>()?;

        Ok(Self {
            asset_name,
            chunk_name,
            inputs,
        })
    }
}

impl BinWrite for DependencyRecord {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let count = u16::try_from(self.inputs.len()).map_err(|_| {
            let pos = writer.stream_position().unwrap_or(0);
            CacheFileError::TooManyInputs {
                chunk: self.chunk_name.clone(),
                count: self.inputs.len(),
            }
            .at(pos)
        })?;

        write_short_string(writer, &self.asset_name)?;
        write_short_string(writer, &self.chunk_name)?;
        count.write_le(writer)?;
        for input in &self.inputs {
            write_short_string(writer, input)?;
        }
        Ok(())
    }
}

impl ReadEndian for DependencyRecord {
    const ENDIAN: EndianKind = EndianKind::Endian(Endian::Little);
}

impl WriteEndian for DependencyRecord {
    const ENDIAN: EndianKind = EndianKind::Endian(Endian::Little);
}
