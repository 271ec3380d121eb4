use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::id::ChunkId;

pub type Result<T> = std::result::Result<T, IffError>;

#[derive(Error, Debug)]
pub enum IffError {
    #[error("Error reading '{attribute}' of chunk '{chunk_id}'")]
    Read {
        chunk_id:  ChunkId,
        attribute: String,
        source:    io::Error,
    },
    #[error("Error writing '{attribute}' of chunk '{chunk_id}'")]
    Write {
        chunk_id:  ChunkId,
        attribute: String,
        source:    io::Error,
    },
    /// An odd-sized chunk was not followed by its padding byte.
    #[error("Unexpected end of file, while reading padding byte of '{chunk_id}'")]
    PaddingRead {
        chunk_id: ChunkId,
        source:   io::Error,
    },
    #[error("Cannot write padding byte of '{chunk_id}'")]
    PaddingWrite {
        chunk_id: ChunkId,
        source:   io::Error,
    },
    #[error("Cannot open file: {}", .path.display())]
    Open {
        path:   PathBuf,
        source: io::Error,
    },
    #[error("Cannot open main chunk")]
    MainChunk(#[source] Box<IffError>),
    #[error("Not a valid IFF-85 file: First bytes should start with either: 'FORM', 'CAT ' or 'LIST' (found '{chunk_id}')")]
    InvalidRoot { chunk_id: ChunkId },
    #[error("Invalid chunk id '{chunk_id}': {reason}")]
    InvalidId {
        chunk_id: ChunkId,
        reason:   &'static str,
    },
    #[error("Identifier must be exactly 4 bytes, got {0}")]
    IdLength(usize),
    /// Children of a group overran the size the group declared.
    #[error("Sub chunks of '{chunk_id}' exceed its declared size: {actual} > {declared}")]
    Overrun {
        chunk_id: ChunkId,
        declared: u32,
        actual:   u64,
    },
    #[error("Invalid chunk '{chunk_id}': {reason}")]
    Structure {
        chunk_id: ChunkId,
        reason:   String,
    },
    #[error("Chunk '{chunk_id}' is not a valid IFF-85 structure")]
    Check { chunk_id: ChunkId },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
