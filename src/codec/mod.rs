//! Scalar codec: fixed-width integers, identifiers and padding bytes.
//!
//! # Endianness
//! Every multi-byte scalar is big-endian on the wire ([`WireOrder`]).  Each
//! operation has a `*_with::<O>` form generic over the byte order; the plain
//! form is that function monomorphized for `WireOrder`.  Whether a swap is
//! needed on this host is settled at compile time inside `byteorder`, never
//! per call.
//!
//! # Diagnostics
//! Every operation takes the id of the chunk being processed and the name of
//! the attribute, used only to label failures.  Failures are reported to the
//! diagnostics sink and returned; nothing is retried.
//!
//! # Padding
//! A chunk with an odd payload size is followed by one pad byte.  Writing
//! always emits zero.  Reading tolerates a non-zero pad with a warning; a
//! missing pad is fatal.

use byteorder::{BigEndian, ByteOrder};

use crate::diagnostics::{self, reported};
use crate::error::{IffError, Result};
use crate::id::{ChunkId, ID_SIZE};
use crate::io_stream::{ChunkReader, ChunkWriter};

pub type WireOrder = BigEndian;

/// Raw regions are pulled in blocks of this size so a corrupt size field
/// cannot force one huge allocation up front.
const READ_BLOCK: usize = 64 * 1024;

// ── Raw transfer ─────────────────────────────────────────────────────────────

fn read_array<const N: usize, R: ChunkReader + ?Sized>(
    reader:    &mut R,
    chunk_id:  ChunkId,
    attribute: &str,
) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_data(&mut buf).map_err(|source| {
        reported(IffError::Read { chunk_id, attribute: attribute.to_owned(), source })
    })?;
    Ok(buf)
}

fn write_slice<W: ChunkWriter + ?Sized>(
    writer:    &mut W,
    buf:       &[u8],
    chunk_id:  ChunkId,
    attribute: &str,
) -> Result<()> {
    writer.write_data(buf).map_err(|source| {
        reported(IffError::Write { chunk_id, attribute: attribute.to_owned(), source })
    })
}

// ── Bytes ────────────────────────────────────────────────────────────────────

pub fn read_ubyte<R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<u8> {
    let [byte] = read_array::<1, _>(reader, chunk_id, attribute)?;
    Ok(byte)
}

pub fn write_ubyte<W: ChunkWriter + ?Sized>(writer: &mut W, value: u8, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    write_slice(writer, &[value], chunk_id, attribute)
}

// ── 16-bit ───────────────────────────────────────────────────────────────────

pub fn read_uword_with<O: ByteOrder, R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<u16> {
    let buf = read_array::<2, _>(reader, chunk_id, attribute)?;
    Ok(O::read_u16(&buf))
}

pub fn write_uword_with<O: ByteOrder, W: ChunkWriter + ?Sized>(writer: &mut W, value: u16, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    let mut buf = [0u8; 2];
    O::write_u16(&mut buf, value);
    write_slice(writer, &buf, chunk_id, attribute)
}

pub fn read_word_with<O: ByteOrder, R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<i16> {
    let buf = read_array::<2, _>(reader, chunk_id, attribute)?;
    Ok(O::read_i16(&buf))
}

pub fn write_word_with<O: ByteOrder, W: ChunkWriter + ?Sized>(writer: &mut W, value: i16, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    let mut buf = [0u8; 2];
    O::write_i16(&mut buf, value);
    write_slice(writer, &buf, chunk_id, attribute)
}

#[inline]
pub fn read_uword<R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<u16> {
    read_uword_with::<WireOrder, _>(reader, chunk_id, attribute)
}

#[inline]
pub fn write_uword<W: ChunkWriter + ?Sized>(writer: &mut W, value: u16, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    write_uword_with::<WireOrder, _>(writer, value, chunk_id, attribute)
}

#[inline]
pub fn read_word<R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<i16> {
    read_word_with::<WireOrder, _>(reader, chunk_id, attribute)
}

#[inline]
pub fn write_word<W: ChunkWriter + ?Sized>(writer: &mut W, value: i16, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    write_word_with::<WireOrder, _>(writer, value, chunk_id, attribute)
}

// ── 32-bit ───────────────────────────────────────────────────────────────────

pub fn read_ulong_with<O: ByteOrder, R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<u32> {
    let buf = read_array::<4, _>(reader, chunk_id, attribute)?;
    Ok(O::read_u32(&buf))
}

pub fn write_ulong_with<O: ByteOrder, W: ChunkWriter + ?Sized>(writer: &mut W, value: u32, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    let mut buf = [0u8; 4];
    O::write_u32(&mut buf, value);
    write_slice(writer, &buf, chunk_id, attribute)
}

pub fn read_long_with<O: ByteOrder, R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<i32> {
    let buf = read_array::<4, _>(reader, chunk_id, attribute)?;
    Ok(O::read_i32(&buf))
}

pub fn write_long_with<O: ByteOrder, W: ChunkWriter + ?Sized>(writer: &mut W, value: i32, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    let mut buf = [0u8; 4];
    O::write_i32(&mut buf, value);
    write_slice(writer, &buf, chunk_id, attribute)
}

#[inline]
pub fn read_ulong<R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<u32> {
    read_ulong_with::<WireOrder, _>(reader, chunk_id, attribute)
}

#[inline]
pub fn write_ulong<W: ChunkWriter + ?Sized>(writer: &mut W, value: u32, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    write_ulong_with::<WireOrder, _>(writer, value, chunk_id, attribute)
}

#[inline]
pub fn read_long<R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<i32> {
    read_long_with::<WireOrder, _>(reader, chunk_id, attribute)
}

#[inline]
pub fn write_long<W: ChunkWriter + ?Sized>(writer: &mut W, value: i32, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    write_long_with::<WireOrder, _>(writer, value, chunk_id, attribute)
}

// ── Identifiers and raw regions ──────────────────────────────────────────────

/// Read a 4-byte identifier.  Identifiers are never byte-swapped.
pub fn read_id<R: ChunkReader + ?Sized>(reader: &mut R, chunk_id: ChunkId, attribute: &str) -> Result<ChunkId> {
    Ok(ChunkId(read_array::<ID_SIZE, _>(reader, chunk_id, attribute)?))
}

pub fn write_id<W: ChunkWriter + ?Sized>(writer: &mut W, value: ChunkId, chunk_id: ChunkId, attribute: &str) -> Result<()> {
    write_slice(writer, value.as_bytes(), chunk_id, attribute)
}

/// Read exactly `len` raw bytes.
pub fn read_bytes<R: ChunkReader + ?Sized>(reader: &mut R, len: usize, chunk_id: ChunkId, attribute: &str) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(len.min(READ_BLOCK));
    while data.len() < len {
        let start = data.len();
        let step = (len - start).min(READ_BLOCK);
        data.resize(start + step, 0);
        reader.read_data(&mut data[start..]).map_err(|source| {
            reported(IffError::Read { chunk_id, attribute: attribute.to_owned(), source })
        })?;
    }
    Ok(data)
}

pub fn write_bytes<W: ChunkWriter + ?Sized>(writer: &mut W, data: &[u8], chunk_id: ChunkId, attribute: &str) -> Result<()> {
    write_slice(writer, data, chunk_id, attribute)
}

// ── Padding ──────────────────────────────────────────────────────────────────

/// `size` rounded up to the next even number.
#[inline]
pub fn padded_size(size: u32) -> u64 {
    u64::from(size) + u64::from(size % 2)
}

/// Consume the pad byte that follows a chunk of `chunk_size` payload bytes.
///
/// `chunk_size` must be the chunk's logical payload size, not however many
/// bytes the caller happened to transfer.  Even sizes read nothing.
pub fn read_padding_byte<R: ChunkReader + ?Sized>(reader: &mut R, chunk_size: u32, chunk_id: ChunkId) -> Result<()> {
    if chunk_size % 2 == 0 {
        return Ok(());
    }

    let mut byte = [0u8; 1];
    reader
        .read_data(&mut byte)
        .map_err(|source| reported(IffError::PaddingRead { chunk_id, source }))?;

    if byte[0] != 0 {
        diagnostics::warning(chunk_id, format_args!("Padding byte is non-zero: {}", byte[0]));
    }
    Ok(())
}

/// Emit a zero pad byte after a chunk of `chunk_size` payload bytes, if odd.
pub fn write_padding_byte<W: ChunkWriter + ?Sized>(writer: &mut W, chunk_size: u32, chunk_id: ChunkId) -> Result<()> {
    if chunk_size % 2 == 0 {
        return Ok(());
    }

    writer
        .write_data(&[0u8])
        .map_err(|source| reported(IffError::PaddingWrite { chunk_id, source }))
}
