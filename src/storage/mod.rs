//! Storage Module
//!
//! Durable segment storage: an append-only store, a memory-mapped offset
//! index, and the segment that binds the two.
//!
//! ## Responsibilities
//! - Append length-prefixed records and read them back by byte position
//! - Resolve a relative record number to its store position in O(1)
//! - Assign absolute offsets and report when a segment should roll over
//! - Resume exactly where a previous process left off, from file sizes alone
//!
//! ## File Format
//! ```text
//! <base_offset>.store
//! ┌────────────────────────────┐
//! │ Frame 1                    │
//! │ ┌──────────┬─────────────┐ │
//! │ │ Len (8)  │ Payload (L) │ │
//! │ └──────────┴─────────────┘ │
//! ├────────────────────────────┤
//! │ Frame 2 ...                │
//! └────────────────────────────┘
//!
//! <base_offset>.index
//! ┌─────────────────────────────────────┐
//! │ Entry 1                             │
//! │ ┌────────────────┬────────────────┐ │
//! │ │ RelOffset (4)  │ Position (8)   │ │
//! │ └────────────────┴────────────────┘ │
//! ├─────────────────────────────────────┤
//! │ Entry 2 ...                         │
//! ├─────────────────────────────────────┤
//! │ zero padding up to max_index_bytes  │
//! │ (only while open)                   │
//! └─────────────────────────────────────┘
//! ```
//! All integers are big-endian.

mod index;
mod segment;
mod store;

pub use index::{EntrySelector, Index};
pub use segment::Segment;
pub use store::{Store, StoreReader};

// =============================================================================
// Shared Constants (used by store, index, segment)
// =============================================================================

/// Width of the length prefix in front of every store frame
pub const LEN_WIDTH: u64 = 8;

/// Width of the relative offset in an index entry
pub const OFF_WIDTH: u64 = 4;

/// Width of the store position in an index entry
pub const POS_WIDTH: u64 = 8;

/// Width of one index entry: RelOffset (4) + Position (8) = 12 bytes
pub const ENT_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

/// File extension of a segment's store file
pub const STORE_SUFFIX: &str = "store";

/// File extension of a segment's index file
pub const INDEX_SUFFIX: &str = "index";
