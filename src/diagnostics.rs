//! Diagnostics sink.
//!
//! Every warning and error path in the crate reports through here. Events go
//! to `tracing` under the [`TARGET`] target; fatal conditions are reported at
//! `ERROR`, advisory ones at `WARN`. Nothing returned from these functions is
//! ever consulted by the caller.

use std::fmt;

use crate::error::IffError;
use crate::id::ChunkId;

pub const TARGET: &str = "iff85";

/// Report a fatal condition. The caller still propagates `err`.
pub fn error(err: &IffError) {
    tracing::error!(target: TARGET, "{err}");
}

/// Report an advisory condition tied to a chunk. Execution continues.
pub fn warning(chunk_id: ChunkId, message: impl fmt::Display) {
    tracing::warn!(target: TARGET, chunk_id = %chunk_id, "{message}");
}

/// Report an advisory condition that belongs to the file rather than a chunk.
pub fn file_warning(message: impl fmt::Display) {
    tracing::warn!(target: TARGET, "{message}");
}

/// Report `err` and hand it back, for use in `map_err` chains.
pub(crate) fn reported(err: IffError) -> IffError {
    error(&err);
    err
}
