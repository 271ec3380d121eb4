//! File-level operations.
//!
//! Each operation owns exactly one stream for its duration, seeds the chunk
//! engine at the root (`parent = None`) and enforces the whole-file framing
//! rules: the root must be a group marker, and nothing may follow the root
//! chunk.  Streams are dropped, and so closed, on every exit path.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::chunk::{Chunk, ChunkEngine};
use crate::diagnostics::{self, reported};
use crate::error::{IffError, Result};
use crate::id::GROUP_MARKERS;
use crate::io_stream::{ChunkReader, ChunkWriter, FileReader, FileWriter, IoReader, IoWriter};

// ── Read ─────────────────────────────────────────────────────────────────────

/// Open `path` and parse its root chunk.
pub fn read<E: ChunkEngine, P: AsRef<Path>>(
    path:       P,
    engine:     &E,
    extensions: &[E::Extension],
) -> Result<E::Chunk> {
    let path = path.as_ref();
    let mut reader = FileReader::open(path)
        .map_err(|source| reported(IffError::Open { path: path.to_path_buf(), source }))?;
    read_reader(&mut reader, engine, extensions)
}

/// Parse the root chunk from an already open source, e.g. `&File` or stdin.
pub fn read_from<E: ChunkEngine, R: Read>(
    input:      R,
    engine:     &E,
    extensions: &[E::Extension],
) -> Result<E::Chunk> {
    let mut reader = IoReader::new(BufReader::new(input));
    read_reader(&mut reader, engine, extensions)
}

/// Parse the root chunk from any stream.
///
/// A byte left over after the root chunk is reported as a warning; the
/// parsed chunk is still returned.
pub fn read_reader<E: ChunkEngine>(
    reader:     &mut dyn ChunkReader,
    engine:     &E,
    extensions: &[E::Extension],
) -> Result<E::Chunk> {
    let chunk = engine
        .read_chunk(reader, None, extensions)
        .map_err(|e| reported(IffError::MainChunk(Box::new(e))))?;

    let mut byte = [0u8; 1];
    if reader.read_data(&mut byte).is_ok() {
        diagnostics::file_warning(format_args!("Trailing IFF contents found: {}", byte[0]));
    }

    Ok(chunk)
}

// ── Write ────────────────────────────────────────────────────────────────────

/// Create (or truncate) `path` and serialize `chunk` into it.
pub fn write<E: ChunkEngine, P: AsRef<Path>>(
    path:       P,
    chunk:      &E::Chunk,
    engine:     &E,
    extensions: &[E::Extension],
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = FileWriter::create(path)
        .map_err(|source| reported(IffError::Open { path: path.to_path_buf(), source }))?;
    write_writer(&mut writer, chunk, engine, extensions)?;
    writer.finish().map_err(|e| reported(IffError::Io(e)))?;
    Ok(())
}

/// Serialize `chunk` into an already open sink, flushing it afterwards.
pub fn write_to<E: ChunkEngine, W: Write>(
    output:     W,
    chunk:      &E::Chunk,
    engine:     &E,
    extensions: &[E::Extension],
) -> Result<()> {
    let mut writer = IoWriter::new(BufWriter::new(output));
    write_writer(&mut writer, chunk, engine, extensions)?;
    writer.finish().map_err(|e| reported(IffError::Io(e)))?;
    Ok(())
}

pub fn write_writer<E: ChunkEngine>(
    writer:     &mut dyn ChunkWriter,
    chunk:      &E::Chunk,
    engine:     &E,
    extensions: &[E::Extension],
) -> Result<()> {
    engine.write_chunk(writer, chunk, None, extensions)
}

// ── Check ────────────────────────────────────────────────────────────────────

/// Validate a whole file's root chunk.
///
/// The root must be `FORM`, `CAT ` or `LIST` (exact bytes); anything else
/// fails without consulting the engine.
pub fn check<E: ChunkEngine>(
    chunk:      &E::Chunk,
    engine:     &E,
    extensions: &[E::Extension],
) -> Result<()> {
    let chunk_id = chunk.chunk_id();
    if !GROUP_MARKERS.contains(&chunk_id) {
        return Err(reported(IffError::InvalidRoot { chunk_id }));
    }

    if engine.check_chunk(chunk, None, extensions) {
        Ok(())
    } else {
        Err(reported(IffError::Check { chunk_id }))
    }
}

// ── Root delegations ─────────────────────────────────────────────────────────

pub fn free<E: ChunkEngine>(chunk: E::Chunk, engine: &E, extensions: &[E::Extension]) {
    engine.free_chunk(chunk, None, extensions);
}

pub fn print<E: ChunkEngine>(
    out:        &mut dyn io::Write,
    chunk:      &E::Chunk,
    indent:     usize,
    engine:     &E,
    extensions: &[E::Extension],
) -> io::Result<()> {
    engine.print_chunk(out, chunk, indent, None, extensions)
}

pub fn compare<E: ChunkEngine>(
    a:          &E::Chunk,
    b:          &E::Chunk,
    engine:     &E,
    extensions: &[E::Extension],
) -> bool {
    engine.compare_chunk(a, b, None, extensions)
}
