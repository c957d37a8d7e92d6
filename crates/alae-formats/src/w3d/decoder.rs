//! Recursive W3D chunk decoder
//!
//! The decoder is stateless. Each call to [`ChunkDecoder::decode_chunk`]
//! reads one header, interprets the payload according to the rule table
//! and leaves the reader exactly at the end of the declared payload, even
//! for tags it does not model.

use std::io::{Cursor, Read, Seek, SeekFrom};

use binrw::BinRead;
use tracing::trace;

use super::chunk::Chunk;
use super::chunk_type::ChunkTag;
use super::error::{W3dError, W3dResult};
use super::header::{CHUNK_HEADER_SIZE, ChunkHeader};
use super::rules::{ChunkRule, Field, InputRule, Layout, NameArray, NameRule, rule_for};
use crate::cache_file::SHORT_STRING_MAX;

/// Deepest container nesting the decoder follows
pub const MAX_NESTING_DEPTH: usize = 64;

/// Longest chunk or input name, bounded by the cache string prefix
pub const MAX_NAME_LEN: usize = SHORT_STRING_MAX;

/// Table-driven W3D chunk decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkDecoder;

impl ChunkDecoder {
    /// Decode a complete W3D file into its primary chunks
    ///
    /// Top-level chunks that are not primary (recognised or not) are
    /// skipped. A primary chunk without a name fails the whole file.
    pub fn decode_file(data: &[u8]) -> W3dResult<Vec<Chunk>> {
        if data.is_empty() {
            return Err(W3dError::EmptyFile);
        }

        let end = data.len() as u64;
        let mut cursor = Cursor::new(data);
        let mut chunks = Vec::new();

        while cursor.position() < end {
            let chunk = Self::decode_chunk(&mut cursor, end)?;
            let primary = chunk
                .tag
                .known()
                .and_then(rule_for)
                .is_some_and(|rule| rule.primary);

            if !primary {
                trace!("Skipping top-level chunk {}", chunk.tag);
                continue;
            }
            if chunk.name.is_none() {
                return Err(W3dError::MissingName {
                    tag: chunk.tag,
                    offset: u64::from(chunk.offset),
                });
            }
            chunks.push(chunk);
        }

        Ok(chunks)
    }

    /// Decode the chunk at the reader position
    ///
    /// `boundary` is the absolute end of the enclosing chunk (or file). The
    /// header and the declared payload must both fit before it.
    pub fn decode_chunk<R: Read + Seek>(reader: &mut R, boundary: u64) -> W3dResult<Chunk> {
        Self::decode_nested(reader, boundary, 0)
    }

    fn decode_nested<R: Read + Seek>(
        reader: &mut R,
        boundary: u64,
        depth: usize,
    ) -> W3dResult<Chunk> {
        let offset = reader.stream_position()?;
        let available = boundary.saturating_sub(offset);
        if available < CHUNK_HEADER_SIZE {
            return Err(W3dError::Truncated { offset, available });
        }

        let header = ChunkHeader::read(reader)?;
        let tag = header.chunk_tag();
        let payload_len = header.payload_len();
        let end = offset + CHUNK_HEADER_SIZE + u64::from(payload_len);
        if end > boundary {
            return Err(W3dError::ChunkOverrun {
                tag,
                offset,
                end,
                boundary,
            });
        }

        if depth > MAX_NESTING_DEPTH {
            return Err(W3dError::TooDeep {
                tag,
                offset,
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }

        let mut chunk = Chunk::new(
            tag,
            None,
            u32::try_from(offset).unwrap_or(u32::MAX),
            payload_len,
        );

        match tag.known().and_then(rule_for) {
            Some(rule) if rule.layout == Layout::Container => {
                Self::decode_children(reader, rule, &mut chunk, end, depth)?;
            }
            Some(rule) => {
                let mut payload = vec![0u8; payload_len as usize];
                reader.read_exact(&mut payload)?;
                Self::decode_leaf(rule, &mut chunk, &payload)?;
            }
            None => trace!("Skipping unrecognized chunk {} at offset {}", tag, offset),
        }

        reader.seek(SeekFrom::Start(end))?;
        Ok(chunk)
    }

    fn decode_children<R: Read + Seek>(
        reader: &mut R,
        rule: &ChunkRule,
        chunk: &mut Chunk,
        end: u64,
        depth: usize,
    ) -> W3dResult<()> {
        let mut inputs = Vec::new();

        while reader.stream_position()? < end {
            let child = Self::decode_nested(reader, end, depth + 1)?;

            if let NameRule::FromChild(source) = rule.name {
                if chunk.name.is_none() && child.tag.is(source) {
                    chunk.name.clone_from(&child.name);
                }
            }
            if let InputRule::ChildNames(source) = rule.inputs {
                if child.tag.is(source) {
                    if let Some(name) = child.name.as_deref() {
                        push_input(&mut inputs, name, child.tag)?;
                    }
                }
            }
            inputs.extend(child.inputs().iter().cloned());
        }

        chunk.set_inputs(inputs);
        Ok(())
    }

    fn decode_leaf(rule: &ChunkRule, chunk: &mut Chunk, payload: &[u8]) -> W3dResult<()> {
        if let NameRule::Inline { name, qualifier } = rule.name {
            let base = read_field(payload, name, chunk.tag)?;
            let qualifier = qualifier
                .map(|field| read_field(payload, field, chunk.tag))
                .transpose()?
                .unwrap_or_default();

            chunk.name = match (qualifier.is_empty(), base.is_empty()) {
                (_, true) => None,
                (true, false) => Some(base),
                (false, false) => Some(format!("{qualifier}.{base}")),
            };
            if let Some(name) = chunk.name.as_deref() {
                check_name_len(name, chunk.tag)?;
            }
        }

        if let InputRule::Inline { fields, array } = rule.inputs {
            let mut inputs = Vec::new();
            for field in fields {
                push_input(&mut inputs, &read_field(payload, *field, chunk.tag)?, chunk.tag)?;
            }
            if let Some(array) = array {
                read_name_array(payload, array, chunk.tag, &mut inputs)?;
            }
            chunk.set_inputs(inputs);
        }

        Ok(())
    }
}

fn push_input(inputs: &mut Vec<String>, name: &str, tag: ChunkTag) -> W3dResult<()> {
    if !name.is_empty() {
        check_name_len(name, tag)?;
        inputs.push(name.to_string());
    }
    Ok(())
}

fn check_name_len(name: &str, tag: ChunkTag) -> W3dResult<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(W3dError::NameTooLong {
            tag,
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Read a NUL-terminated string from a payload field
fn read_field(payload: &[u8], field: Field, tag: ChunkTag) -> W3dResult<String> {
    let end = field.len.map_or(payload.len(), |len| field.offset + len);
    let bytes = payload
        .get(field.offset..end)
        .ok_or(W3dError::FieldOutOfBounds {
            tag,
            offset: field.offset,
            end,
            len: payload.len(),
        })?;

    let text = bytes.split(|byte| *byte == 0).next().unwrap_or_default();
    Ok(String::from_utf8_lossy(text).into_owned())
}

fn read_name_array(
    payload: &[u8],
    array: NameArray,
    tag: ChunkTag,
    inputs: &mut Vec<String>,
) -> W3dResult<()> {
    let out_of_bounds = |offset: usize, end: usize| W3dError::FieldOutOfBounds {
        tag,
        offset,
        end,
        len: payload.len(),
    };

    let count_end = array.count_at + 4;
    let count_bytes: [u8; 4] = payload
        .get(array.count_at..count_end)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| out_of_bounds(array.count_at, count_end))?;
    let count = u32::from_le_bytes(count_bytes) as usize;

    // Reject the whole array up front rather than reading a partial list
    let array_end = count
        .checked_mul(array.stride)
        .and_then(|span| span.checked_add(array.first))
        .filter(|array_end| *array_end <= payload.len())
        .ok_or_else(|| out_of_bounds(array.first, usize::MAX))?;
    trace!("Reading {} names ending at {}", count, array_end);

    for i in 0..count {
        let field = Field::fixed(array.first + i * array.stride, array.len);
        push_input(inputs, &read_field(payload, field, tag)?, tag)?;
    }
    Ok(())
}
