//! The chunk-tree engine contract.
//!
//! The file-level operations in [`crate::iff`] never look inside a chunk
//! beyond its identifier; all structural work is delegated to a
//! [`ChunkEngine`].  Engines borrow the stream they are handed for the
//! duration of one call and must not keep it.
//!
//! [`RawEngine`] is the generic engine: it understands the group chunks
//! (`FORM`, `CAT `, `LIST`, `PROP`) and keeps every other chunk as raw
//! bytes.  Applications with their own chunk types implement
//! [`ChunkEngine`] and receive their extension table unmodified.

mod raw;

use std::io;

use crate::error::Result;
use crate::id::ChunkId;
use crate::io_stream::{ChunkReader, ChunkWriter};

pub use raw::{NoExtension, RawChunk, RawEngine, CHUNK_HEADER_SIZE, HEX_PREVIEW_LEN};

/// Anything the engine produces must expose its identifier.
pub trait Chunk {
    fn chunk_id(&self) -> ChunkId;
}

/// The enclosing group of a chunk being processed.  Root-level calls pass
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent {
    pub chunk_id:   ChunkId,
    pub group_type: ChunkId,
}

pub trait ChunkEngine {
    type Chunk: Chunk;
    /// One entry of the caller's extension table.
    type Extension;

    fn read_chunk(
        &self,
        reader:     &mut dyn ChunkReader,
        parent:     Option<&Parent>,
        extensions: &[Self::Extension],
    ) -> Result<Self::Chunk>;

    fn write_chunk(
        &self,
        writer:     &mut dyn ChunkWriter,
        chunk:      &Self::Chunk,
        parent:     Option<&Parent>,
        extensions: &[Self::Extension],
    ) -> Result<()>;

    /// Structural validation.  Problems are reported to the diagnostics
    /// sink; the return value only says whether any were found.
    fn check_chunk(
        &self,
        chunk:      &Self::Chunk,
        parent:     Option<&Parent>,
        extensions: &[Self::Extension],
    ) -> bool;

    /// Release a chunk tree.  Engines that hold resources outside the tree
    /// override this; dropping is enough otherwise.
    fn free_chunk(
        &self,
        chunk:       Self::Chunk,
        _parent:     Option<&Parent>,
        _extensions: &[Self::Extension],
    ) {
        drop(chunk);
    }

    fn print_chunk(
        &self,
        out:        &mut dyn io::Write,
        chunk:      &Self::Chunk,
        indent:     usize,
        parent:     Option<&Parent>,
        extensions: &[Self::Extension],
    ) -> io::Result<()>;

    fn compare_chunk(
        &self,
        a:          &Self::Chunk,
        b:          &Self::Chunk,
        parent:     Option<&Parent>,
        extensions: &[Self::Extension],
    ) -> bool;
}
