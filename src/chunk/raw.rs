//! Generic chunk engine: group chunks are parsed into trees, everything else
//! is kept as raw bytes.
//!
//! Wire layout of every chunk: `id (4) | size (u32 BE) | payload | pad?`.
//! A group's payload is `type (4) | chunk*`; its size counts the type id and
//! every child including their headers and pad bytes.

use std::io;

use serde::{Serialize, Serializer};

use super::{Chunk, ChunkEngine, Parent};
use crate::codec::{self, padded_size};
use crate::diagnostics::{self, reported};
use crate::error::{IffError, Result};
use crate::id::{ChunkId, ID_CAT, ID_FORM, ID_JJJJ, ID_LIST, ID_PROP, ID_SIZE};
use crate::io_stream::{ChunkReader, ChunkWriter};

/// Bytes taken by a chunk's id and size fields.
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// Number of leading data bytes `print_chunk` shows for a data chunk.
pub const HEX_PREVIEW_LEN: usize = 16;

/// Context id used while the id of a root chunk is still being read.
const ID_UNKNOWN: ChunkId = ChunkId(*b"????");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawChunk {
    Group {
        chunk_id:   ChunkId,
        chunk_size: u32,
        group_type: ChunkId,
        chunks:     Vec<RawChunk>,
    },
    Data {
        chunk_id:   ChunkId,
        chunk_size: u32,
        #[serde(serialize_with = "serialize_hex")]
        data:       Vec<u8>,
    },
}

fn serialize_hex<S: Serializer>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(data))
}

fn clamp_size(size: u64) -> u32 {
    u32::try_from(size).unwrap_or(u32::MAX)
}

impl RawChunk {
    /// A group chunk with its size computed from `chunks`.
    pub fn group(chunk_id: ChunkId, group_type: ChunkId, chunks: Vec<RawChunk>) -> Self {
        let mut chunk = RawChunk::Group { chunk_id, chunk_size: 0, group_type, chunks };
        let size = chunk.computed_size();
        if let RawChunk::Group { chunk_size, .. } = &mut chunk {
            *chunk_size = clamp_size(size);
        }
        chunk
    }

    pub fn form(form_type: ChunkId, chunks: Vec<RawChunk>) -> Self {
        Self::group(ID_FORM, form_type, chunks)
    }

    pub fn cat(contents_type: ChunkId, chunks: Vec<RawChunk>) -> Self {
        Self::group(ID_CAT, contents_type, chunks)
    }

    pub fn list(contents_type: ChunkId, chunks: Vec<RawChunk>) -> Self {
        Self::group(ID_LIST, contents_type, chunks)
    }

    pub fn prop(form_type: ChunkId, chunks: Vec<RawChunk>) -> Self {
        Self::group(ID_PROP, form_type, chunks)
    }

    pub fn data(chunk_id: ChunkId, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        RawChunk::Data { chunk_id, chunk_size: clamp_size(data.len() as u64), data }
    }

    /// The size stored in the chunk header.
    pub fn chunk_size(&self) -> u32 {
        match self {
            RawChunk::Group { chunk_size, .. } | RawChunk::Data { chunk_size, .. } => *chunk_size,
        }
    }

    pub fn group_type(&self) -> Option<ChunkId> {
        match self {
            RawChunk::Group { group_type, .. } => Some(*group_type),
            RawChunk::Data { .. } => None,
        }
    }

    pub fn chunks(&self) -> &[RawChunk] {
        match self {
            RawChunk::Group { chunks, .. } => chunks,
            RawChunk::Data { .. } => &[],
        }
    }

    /// The payload size implied by the contents, using each child's stored
    /// size.
    pub fn computed_size(&self) -> u64 {
        match self {
            RawChunk::Data { data, .. } => data.len() as u64,
            RawChunk::Group { chunks, .. } => {
                ID_SIZE as u64
                    + chunks
                        .iter()
                        .map(|c| CHUNK_HEADER_SIZE + padded_size(c.chunk_size()))
                        .sum::<u64>()
            }
        }
    }

    /// Recompute every stored size bottom-up after the tree was edited.
    pub fn update_sizes(&mut self) {
        if let RawChunk::Group { chunks, .. } = self {
            for child in chunks.iter_mut() {
                child.update_sizes();
            }
        }
        let size = clamp_size(self.computed_size());
        match self {
            RawChunk::Group { chunk_size, .. } | RawChunk::Data { chunk_size, .. } => *chunk_size = size,
        }
    }
}

impl Chunk for RawChunk {
    fn chunk_id(&self) -> ChunkId {
        match self {
            RawChunk::Group { chunk_id, .. } | RawChunk::Data { chunk_id, .. } => *chunk_id,
        }
    }
}

/// [`RawEngine`] recognises no application chunk types, so its extension
/// table is always empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoExtension {}

#[derive(Debug, Clone, Copy, Default)]
pub struct RawEngine;

impl RawEngine {
    fn read_group(
        &self,
        reader:     &mut dyn ChunkReader,
        chunk_id:   ChunkId,
        chunk_size: u32,
        extensions: &[NoExtension],
    ) -> Result<RawChunk> {
        let declared = u64::from(chunk_size);
        if declared < ID_SIZE as u64 {
            return Err(reported(IffError::Overrun { chunk_id, declared: chunk_size, actual: ID_SIZE as u64 }));
        }

        let group_type = codec::read_id(reader, chunk_id, "groupType")?;
        let this = Parent { chunk_id, group_type };

        let mut consumed = ID_SIZE as u64;
        let mut chunks = Vec::new();
        while consumed < declared {
            let child = self.read_chunk(reader, Some(&this), extensions)?;
            consumed += CHUNK_HEADER_SIZE + padded_size(child.chunk_size());
            chunks.push(child);
        }

        if consumed > declared {
            return Err(reported(IffError::Overrun { chunk_id, declared: chunk_size, actual: consumed }));
        }

        Ok(RawChunk::Group { chunk_id, chunk_size, group_type, chunks })
    }
}

fn invalid(chunk_id: ChunkId, reason: impl Into<String>) -> bool {
    diagnostics::error(&IffError::Structure { chunk_id, reason: reason.into() });
    false
}

impl ChunkEngine for RawEngine {
    type Chunk = RawChunk;
    type Extension = NoExtension;

    fn read_chunk(
        &self,
        reader:     &mut dyn ChunkReader,
        parent:     Option<&Parent>,
        extensions: &[NoExtension],
    ) -> Result<RawChunk> {
        let context = parent.map_or(ID_UNKNOWN, |p| p.chunk_id);
        let chunk_id = codec::read_id(reader, context, "chunkId")?;
        let chunk_size = codec::read_ulong(reader, chunk_id, "chunkSize")?;

        let chunk = if chunk_id.is_group() {
            self.read_group(reader, chunk_id, chunk_size, extensions)?
        } else {
            let data = codec::read_bytes(reader, chunk_size as usize, chunk_id, "chunkData")?;
            RawChunk::Data { chunk_id, chunk_size, data }
        };

        codec::read_padding_byte(reader, chunk_size, chunk_id)?;
        tracing::trace!(target: diagnostics::TARGET, chunk_id = %chunk_id, chunk_size, "read chunk");
        Ok(chunk)
    }

    fn write_chunk(
        &self,
        writer:     &mut dyn ChunkWriter,
        chunk:      &RawChunk,
        parent:     Option<&Parent>,
        extensions: &[NoExtension],
    ) -> Result<()> {
        let context = parent.map_or(ID_UNKNOWN, |p| p.chunk_id);
        let chunk_id = chunk.chunk_id();
        let chunk_size = chunk.chunk_size();

        codec::write_id(writer, chunk_id, context, "chunkId")?;
        codec::write_ulong(writer, chunk_size, chunk_id, "chunkSize")?;

        match chunk {
            RawChunk::Group { group_type, chunks, .. } => {
                codec::write_id(writer, *group_type, chunk_id, "groupType")?;
                let this = Parent { chunk_id, group_type: *group_type };
                for child in chunks {
                    self.write_chunk(writer, child, Some(&this), extensions)?;
                }
            }
            RawChunk::Data { data, .. } => {
                codec::write_bytes(writer, data, chunk_id, "chunkData")?;
            }
        }

        codec::write_padding_byte(writer, chunk_size, chunk_id)
    }

    fn check_chunk(
        &self,
        chunk:      &RawChunk,
        parent:     Option<&Parent>,
        extensions: &[NoExtension],
    ) -> bool {
        let mut ok = true;
        let chunk_id = chunk.chunk_id();

        if let Err(e) = chunk_id.check() {
            diagnostics::error(&e);
            ok = false;
        }

        let computed = chunk.computed_size();
        if computed != u64::from(chunk.chunk_size()) {
            ok &= invalid(chunk_id, format!(
                "stored size {} does not match the computed size {computed}",
                chunk.chunk_size(),
            ));
        }

        match chunk {
            RawChunk::Data { .. } => {
                if chunk_id.is_group() {
                    ok &= invalid(chunk_id, "group chunk id used for a data chunk");
                }
                if let Some(p) = parent {
                    if p.chunk_id == ID_CAT || p.chunk_id == ID_LIST {
                        ok &= invalid(chunk_id, format!("data chunks are not allowed inside '{}'", p.chunk_id));
                    }
                }
            }
            RawChunk::Group { group_type, chunks, .. } => {
                if let Err(e) = group_type.check_group_type(chunk_id) {
                    diagnostics::error(&e);
                    ok = false;
                }
                if chunk_id == ID_PROP && parent.map_or(true, |p| p.chunk_id != ID_LIST) {
                    ok &= invalid(chunk_id, "PROP chunks may only appear inside a LIST");
                }

                let this = Parent { chunk_id, group_type: *group_type };
                for child in chunks {
                    match (chunk_id, child) {
                        (ID_PROP, RawChunk::Group { chunk_id: child_id, .. }) => {
                            ok &= invalid(*child_id, "PROP chunks may only contain data chunks");
                        }
                        (ID_CAT | ID_LIST, RawChunk::Group { chunk_id: child_id, group_type: child_type, .. })
                            if *group_type != ID_JJJJ && *child_id != ID_PROP && child_type != group_type =>
                        {
                            ok &= invalid(*child_id, format!(
                                "contents type '{child_type}' differs from the '{chunk_id}' type '{group_type}'"
                            ));
                        }
                        _ => {}
                    }
                    ok &= self.check_chunk(child, Some(&this), extensions);
                }
            }
        }

        ok
    }

    fn print_chunk(
        &self,
        out:        &mut dyn io::Write,
        chunk:      &RawChunk,
        indent:     usize,
        _parent:    Option<&Parent>,
        extensions: &[NoExtension],
    ) -> io::Result<()> {
        let pad = "  ".repeat(indent);
        match chunk {
            RawChunk::Group { chunk_id, chunk_size, group_type, chunks } => {
                writeln!(out, "{pad}'{chunk_id}' '{group_type}' ({chunk_size} bytes)")?;
                let this = Parent { chunk_id: *chunk_id, group_type: *group_type };
                for child in chunks {
                    self.print_chunk(out, child, indent + 1, Some(&this), extensions)?;
                }
            }
            RawChunk::Data { chunk_id, chunk_size, data } => {
                let shown = &data[..data.len().min(HEX_PREVIEW_LEN)];
                let more = if data.len() > HEX_PREVIEW_LEN { "..." } else { "" };
                writeln!(out, "{pad}'{chunk_id}' ({chunk_size} bytes) {}{more}", hex::encode(shown))?;
            }
        }
        Ok(())
    }

    fn compare_chunk(
        &self,
        a:          &RawChunk,
        b:          &RawChunk,
        _parent:    Option<&Parent>,
        extensions: &[NoExtension],
    ) -> bool {
        match (a, b) {
            (
                RawChunk::Group { chunk_id: id_a, chunk_size: size_a, group_type: type_a, chunks: chunks_a },
                RawChunk::Group { chunk_id: id_b, chunk_size: size_b, group_type: type_b, chunks: chunks_b },
            ) => {
                let this = Parent { chunk_id: *id_a, group_type: *type_a };
                id_a == id_b
                    && size_a == size_b
                    && type_a == type_b
                    && chunks_a.len() == chunks_b.len()
                    && chunks_a
                        .iter()
                        .zip(chunks_b)
                        .all(|(x, y)| self.compare_chunk(x, y, Some(&this), extensions))
            }
            (RawChunk::Data { .. }, RawChunk::Data { .. }) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::capture::capture;
    use crate::io_stream::{MemoryReader, MemoryWriter};

    fn id(s: &[u8; 4]) -> ChunkId {
        ChunkId(*s)
    }

    fn sample() -> RawChunk {
        RawChunk::form(id(b"TEST"), vec![
            RawChunk::data(id(b"HELO"), b"abc".to_vec()),
            RawChunk::data(id(b"BYE "), b"xy".to_vec()),
        ])
    }

    fn encode(chunk: &RawChunk) -> Vec<u8> {
        let mut out = MemoryWriter::new();
        RawEngine.write_chunk(&mut out, chunk, None, &[]).unwrap();
        out.into_inner()
    }

    #[test]
    fn sizes_are_computed_with_padding() {
        let form = sample();
        // type + (8 + 3 + pad) + (8 + 2)
        assert_eq!(form.chunk_size(), 4 + 12 + 10);
        assert_eq!(form.group_type(), Some(id(b"TEST")));
        assert_eq!(form.chunks().len(), 2);
    }

    #[test]
    fn writes_expected_bytes() {
        let bytes = encode(&sample());
        let mut expected = Vec::new();
        expected.extend_from_slice(b"FORM");
        expected.extend_from_slice(&26u32.to_be_bytes());
        expected.extend_from_slice(b"TEST");
        expected.extend_from_slice(b"HELO");
        expected.extend_from_slice(&3u32.to_be_bytes());
        expected.extend_from_slice(b"abc\0");
        expected.extend_from_slice(b"BYE ");
        expected.extend_from_slice(&2u32.to_be_bytes());
        expected.extend_from_slice(b"xy");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn reads_back_what_it_writes() {
        let tree = RawChunk::cat(ID_JJJJ, vec![
            sample(),
            RawChunk::list(id(b"TEST"), vec![
                RawChunk::prop(id(b"TEST"), vec![RawChunk::data(id(b"DFLT"), vec![1u8])]),
                sample(),
            ]),
        ]);
        let bytes = encode(&tree);
        let mut r = MemoryReader::new(&bytes);
        let back = RawEngine.read_chunk(&mut r, None, &[]).unwrap();
        assert_eq!(r.remaining(), 0);
        assert!(RawEngine.compare_chunk(&tree, &back, None, &[]));
    }

    #[test]
    fn overrunning_children_are_rejected() {
        let mut bytes = encode(&sample());
        // Shrink the FORM so its last child sticks out.
        bytes[4..8].copy_from_slice(&20u32.to_be_bytes());
        let mut r = MemoryReader::new(&bytes);
        let err = RawEngine.read_chunk(&mut r, None, &[]).unwrap_err();
        assert!(matches!(err, IffError::Overrun { declared: 20, actual: 26, .. }));
    }

    #[test]
    fn group_too_small_for_its_type_is_rejected() {
        let mut bytes = b"FORM".to_vec();
        bytes.extend_from_slice(&2u32.to_be_bytes());
        let mut r = MemoryReader::new(&bytes);
        assert!(matches!(
            RawEngine.read_chunk(&mut r, None, &[]),
            Err(IffError::Overrun { declared: 2, .. })
        ));
    }

    #[test]
    fn truncated_payload_is_a_read_error() {
        let bytes = encode(&sample());
        let mut r = MemoryReader::new(&bytes[..bytes.len() - 1]);
        let err = RawEngine.read_chunk(&mut r, None, &[]).unwrap_err();
        assert!(matches!(err, IffError::Read { ref attribute, .. } if attribute == "chunkData"));
    }

    #[test]
    fn check_accepts_well_formed_trees() {
        let (ok, log) = capture(|| RawEngine.check_chunk(&sample(), None, &[]));
        assert!(ok);
        assert!(log.errors().is_empty());
    }

    #[test]
    fn check_rejects_stale_sizes() {
        let mut form = sample();
        if let RawChunk::Group { chunks, .. } = &mut form {
            chunks.push(RawChunk::data(id(b"MORE"), vec![0u8; 4]));
        }
        let (ok, log) = capture(|| RawEngine.check_chunk(&form, None, &[]));
        assert!(!ok);
        assert_eq!(log.errors().len(), 1);

        form.update_sizes();
        assert!(RawEngine.check_chunk(&form, None, &[]));
    }

    #[test]
    fn check_rejects_prop_outside_list() {
        let form = RawChunk::form(id(b"TEST"), vec![
            RawChunk::prop(id(b"TEST"), vec![RawChunk::data(id(b"DFLT"), Vec::<u8>::new())]),
        ]);
        assert!(!RawEngine.check_chunk(&form, None, &[]));
    }

    #[test]
    fn check_rejects_data_directly_in_cat() {
        let cat = RawChunk::cat(ID_JJJJ, vec![RawChunk::data(id(b"LOOS"), vec![1u8, 2])]);
        assert!(!RawEngine.check_chunk(&cat, None, &[]));
    }

    #[test]
    fn check_rejects_mismatched_contents_type() {
        let cat = RawChunk::cat(id(b"ILBM"), vec![sample()]);
        let (ok, log) = capture(|| RawEngine.check_chunk(&cat, None, &[]));
        assert!(!ok);
        assert!(log.errors()[0].contains("TEST"));
    }

    #[test]
    fn check_rejects_bad_ids() {
        let form = RawChunk::form(id(b"test"), vec![RawChunk::data(id(b" BAD"), Vec::<u8>::new())]);
        let (ok, log) = capture(|| RawEngine.check_chunk(&form, None, &[]));
        assert!(!ok);
        assert_eq!(log.errors().len(), 2);
    }

    #[test]
    fn compare_detects_differences() {
        let a = sample();
        let b = RawChunk::form(id(b"TEST"), vec![
            RawChunk::data(id(b"HELO"), b"abd".to_vec()),
            RawChunk::data(id(b"BYE "), b"xy".to_vec()),
        ]);
        assert!(RawEngine.compare_chunk(&a, &a.clone(), None, &[]));
        assert!(!RawEngine.compare_chunk(&a, &b, None, &[]));
        assert!(!RawEngine.compare_chunk(&a, &a.chunks()[0], None, &[]));
    }

    #[test]
    fn prints_indented_tree() {
        let mut out = Vec::new();
        RawEngine.print_chunk(&mut out, &sample(), 1, None, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "  'FORM' 'TEST' (26 bytes)\n    'HELO' (3 bytes) 616263\n    'BYE ' (2 bytes) 7879\n"
        );
    }

    #[test]
    fn long_data_is_truncated_in_print() {
        let mut out = Vec::new();
        let chunk = RawChunk::data(id(b"BODY"), vec![0xABu8; HEX_PREVIEW_LEN + 1]);
        RawEngine.print_chunk(&mut out, &chunk, 0, None, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("...\n"));
        assert_eq!(text.matches("ab").count(), HEX_PREVIEW_LEN);
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["kind"], "group");
        assert_eq!(json["chunk_id"], "FORM");
        assert_eq!(json["chunks"][0]["data"], "616263");
    }
}
