//! Record definitions
//!
//! A record is the unit appended to a segment. Its on-disk form is the
//! bincode encoding of [`Record`], stored as one store frame.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// A single immutable entry in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque payload
    pub value: Bytes,

    /// Absolute offset, assigned by the segment on append
    pub offset: u64,
}

impl Record {
    /// Create a record with an unassigned (zero) offset
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            offset: 0,
        }
    }

    /// Encode into the payload handed to the store
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| LogError::Serialization(e.to_string()))
    }

    /// Decode a payload read back from the store
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| LogError::Serialization(e.to_string()))
    }
}
