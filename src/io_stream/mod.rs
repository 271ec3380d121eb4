//! Byte transport for chunk files.
//!
//! # Contract
//! [`ChunkReader::read_data`] fills the whole buffer or fails;
//! [`ChunkWriter::write_data`] emits the whole buffer or fails.  A short
//! transfer is a total failure (`io::ErrorKind::UnexpectedEof` /
//! `WriteZero`), never a partial count.  Nothing here buffers beyond what
//! the wrapped backend does, seeks, or retries.
//!
//! # Backends
//! - [`IoReader`] / [`IoWriter`]: adapters over any `std::io` reader/writer.
//!   [`FileReader`] / [`FileWriter`] bind them to a buffered [`File`].
//! - [`MemoryReader`] / [`MemoryWriter`]: in-memory buffers.
//!
//! Any other backend (a test double, a socket) only has to implement the
//! one-method traits.  Streams release their resource on drop.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

// ── Capability traits ────────────────────────────────────────────────────────

pub trait ChunkReader {
    /// Fill `buf` completely from the backend.
    fn read_data(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

pub trait ChunkWriter {
    /// Emit all of `buf` to the backend.
    fn write_data(&mut self, buf: &[u8]) -> io::Result<()>;
}

impl<T: ChunkReader + ?Sized> ChunkReader for &mut T {
    #[inline]
    fn read_data(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_data(buf)
    }
}

impl<T: ChunkWriter + ?Sized> ChunkWriter for &mut T {
    #[inline]
    fn write_data(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_data(buf)
    }
}

impl<T: ChunkReader + ?Sized> ChunkReader for Box<T> {
    #[inline]
    fn read_data(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_data(buf)
    }
}

impl<T: ChunkWriter + ?Sized> ChunkWriter for Box<T> {
    #[inline]
    fn write_data(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_data(buf)
    }
}

// ── std::io adapters ─────────────────────────────────────────────────────────

/// One-to-one adapter from [`Read`] to [`ChunkReader`].
pub struct IoReader<R: Read> {
    inner: R,
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ChunkReader for IoReader<R> {
    fn read_data(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)
    }
}

/// One-to-one adapter from [`Write`] to [`ChunkWriter`].
pub struct IoWriter<W: Write> {
    inner: W,
}

impl<W: Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Flush the backend and return it.  Call this before dropping a writer
    /// whose backend buffers, or write errors on the final flush are lost.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> ChunkWriter for IoWriter<W> {
    fn write_data(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)
    }
}

pub type FileReader = IoReader<BufReader<File>>;
pub type FileWriter = IoWriter<BufWriter<File>>;

impl FileReader {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::from_file(File::open(path)?))
    }

    pub fn from_file(file: File) -> Self {
        IoReader::new(BufReader::new(file))
    }
}

impl FileWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::from_file(File::create(path)?))
    }

    pub fn from_file(file: File) -> Self {
        IoWriter::new(BufWriter::new(file))
    }
}

// ── In-memory backends ───────────────────────────────────────────────────────

/// Reads from a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct MemoryReader<'a> {
    data: &'a [u8],
    pos:  usize,
}

impl<'a> MemoryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ChunkReader for MemoryReader<'_> {
    fn read_data(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if buf.len() > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("requested {} bytes, {} available", buf.len(), self.remaining()),
            ));
        }
        let end = self.pos + buf.len();
        buf.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }
}

/// Appends to an owned `Vec<u8>`.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    data: Vec<u8>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ChunkWriter for MemoryWriter {
    fn write_data(&mut self, buf: &[u8]) -> io::Result<()> {
        self.data.extend_from_slice(buf);
        Ok(())
    }
}
