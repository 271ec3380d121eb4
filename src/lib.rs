pub mod id;
pub mod error;
pub mod diagnostics;
pub mod io_stream;
pub mod codec;
pub mod chunk;
pub mod iff;

pub use id::ChunkId;
pub use error::{IffError, Result};
pub use chunk::{Chunk, ChunkEngine, Parent, RawChunk, RawEngine};
pub use io_stream::{ChunkReader, ChunkWriter, FileReader, FileWriter, MemoryReader, MemoryWriter};
