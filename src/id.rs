//! Four-byte chunk identifiers.
//!
//! An identifier is raw bytes on the wire: it is compared byte-for-byte and
//! never interpreted as an integer. Its `Display` impl is the formatting
//! helper every diagnostic goes through.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::IffError;

/// Number of bytes in an identifier.
pub const ID_SIZE: usize = 4;

pub const ID_FORM: ChunkId = ChunkId(*b"FORM");
pub const ID_CAT:  ChunkId = ChunkId(*b"CAT ");
pub const ID_LIST: ChunkId = ChunkId(*b"LIST");
pub const ID_PROP: ChunkId = ChunkId(*b"PROP");

/// The identifiers a well-formed file may start with.
pub const GROUP_MARKERS: [ChunkId; 3] = [ID_FORM, ID_CAT, ID_LIST];

/// Conventional "any type" contents id for `CAT ` and `LIST` groups.
pub const ID_JJJJ: ChunkId = ChunkId(*b"JJJJ");

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub [u8; ID_SIZE]);

impl ChunkId {
    pub const fn new(bytes: [u8; ID_SIZE]) -> Self {
        ChunkId(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// `FORM`, `CAT `, `LIST` or `PROP`.
    pub fn is_group(&self) -> bool {
        GROUP_MARKERS.contains(self) || *self == ID_PROP
    }

    /// An id is valid when every byte is printable ASCII and the first byte
    /// is not a space.
    pub fn check(&self) -> Result<(), IffError> {
        if self.0.iter().any(|b| !(0x20..=0x7e).contains(b)) {
            return Err(IffError::InvalidId {
                chunk_id: *self,
                reason:   "contains non-printable characters",
            });
        }
        if self.0[0] == b' ' {
            return Err(IffError::InvalidId {
                chunk_id: *self,
                reason:   "must not start with a space",
            });
        }
        Ok(())
    }

    /// Validate `self` as the contents type of a group chunk whose own id is
    /// `group`.
    ///
    /// Group types may not be one of the group markers themselves. `FORM`
    /// types are stricter: no lowercase letters, and the only punctuation
    /// allowed is trailing space padding.
    pub fn check_group_type(&self, group: ChunkId) -> Result<(), IffError> {
        self.check()?;

        if self.is_group() {
            return Err(IffError::InvalidId {
                chunk_id: *self,
                reason:   "group type must not be a group chunk id",
            });
        }

        if group == ID_FORM {
            if self.0.iter().any(|b| b.is_ascii_lowercase()) {
                return Err(IffError::InvalidId {
                    chunk_id: *self,
                    reason:   "form type must not contain lowercase letters",
                });
            }
            if self.0.iter().any(|b| b.is_ascii_punctuation()) {
                return Err(IffError::InvalidId {
                    chunk_id: *self,
                    reason:   "form type must not contain punctuation",
                });
            }
            let trimmed = self.0.iter().rposition(|b| *b != b' ').map_or(0, |i| i + 1);
            if self.0[..trimmed].contains(&b' ') {
                return Err(IffError::InvalidId {
                    chunk_id: *self,
                    reason:   "form type may only contain trailing spaces",
                });
            }
        }

        Ok(())
    }
}

impl From<[u8; ID_SIZE]> for ChunkId {
    fn from(bytes: [u8; ID_SIZE]) -> Self {
        ChunkId(bytes)
    }
}

impl FromStr for ChunkId {
    type Err = IffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; ID_SIZE] = s
            .as_bytes()
            .try_into()
            .map_err(|_| IffError::IdLength(s.len()))?;
        Ok(ChunkId(bytes))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if (0x20..=0x7e).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId(\"{self}\")")
    }
}

impl Serialize for ChunkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
