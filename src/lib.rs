//! # commitlog
//!
//! Durable storage core for a replicated append-only commit log:
//! - Length-prefixed, append-only store files
//! - Memory-mapped, fixed-width offset indexes
//! - Segments binding one store and one index under a base offset
//! - Restart recovery from file sizes alone
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Log manager (external)                     │
//! │          (segment list, rollover, active segment)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Segment                               │
//! │        (offset assignment, is_maxed, close/remove)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Store    │          │    Index    │
//!   │  (Mutex)    │          │   (mmap)    │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LogError, Result};
pub use config::{Config, SegmentConfig};
pub use record::Record;
pub use storage::{EntrySelector, Index, Segment, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of commitlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
