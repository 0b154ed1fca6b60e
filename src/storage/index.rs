//! Index
//!
//! Memory-mapped table of fixed 12-byte entries mapping a relative record
//! number to the byte position of its frame in the store.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;

use crate::error::{LogError, Result};

use super::{ENT_WIDTH, OFF_WIDTH, POS_WIDTH};

/// Which entry to read from an [`Index`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySelector {
    /// The most recently written entry
    Last,
    /// The entry with this zero-based number
    At(u64),
}

/// Offset index for one segment
///
/// The backing file is sized to the full capacity while open so the mapping
/// never has to grow; `size` tracks how much of it is actually used.
///
/// ## Concurrency:
/// - No internal locking. `write` takes `&mut self`, so the borrow checker
///   guarantees a single writer; reads take `&self` and may run in parallel.
pub struct Index {
    /// Path of the backing file
    path: PathBuf,
    /// Backing file handle (kept for sync and truncate on close)
    file: File,
    /// Read-write shared mapping over the whole capacity
    mmap: MmapMut,
    /// Logical size in bytes; always a multiple of ENT_WIDTH
    size: u64,
    /// Set once the mapping has been synced and the file truncated
    closed: bool,
}

impl Index {
    /// Open or create an index file with a fixed capacity of `max_bytes`
    ///
    /// The logical size is recovered from the current file length, then the
    /// file is resized to exactly `max_bytes` and mapped.
    pub fn open(path: &Path, max_bytes: u64) -> Result<Self> {
        if max_bytes < ENT_WIDTH {
            return Err(LogError::Config(format!(
                "index capacity {} cannot hold a {}-byte entry",
                max_bytes, ENT_WIDTH
            )));
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let file_len = file.metadata()?.len();
        let size = Self::recover_size(path, file_len, max_bytes);

        file.set_len(max_bytes)?;

        // SAFETY: the file is owned by this Index for the lifetime of the
        // mapping and the data directory is not modified by other processes.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        tracing::debug!(
            "Opened index {} (size={}, capacity={})",
            path.display(),
            size,
            max_bytes
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            mmap,
            size,
            closed: false,
        })
    }

    /// Read the entry picked by `selector`
    ///
    /// Returns `(relative_offset, position)`, or `LogError::Eof` if the
    /// entry has not been written.
    pub fn read(&self, selector: EntrySelector) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(LogError::Eof);
        }

        let entry = match selector {
            EntrySelector::Last => self.entries() - 1,
            EntrySelector::At(n) => n,
        };

        let start = entry.checked_mul(ENT_WIDTH).ok_or(LogError::Eof)?;
        if start.saturating_add(ENT_WIDTH) > self.size {
            return Err(LogError::Eof);
        }

        let start = start as usize;
        let mid = start + OFF_WIDTH as usize;
        let end = mid + POS_WIDTH as usize;

        let mut off = [0u8; OFF_WIDTH as usize];
        off.copy_from_slice(&self.mmap[start..mid]);
        let mut pos = [0u8; POS_WIDTH as usize];
        pos.copy_from_slice(&self.mmap[mid..end]);

        Ok((u32::from_be_bytes(off), u64::from_be_bytes(pos)))
    }

    /// Append one entry
    ///
    /// Fails with `LogError::Eof` when the entry would not fit in the
    /// capacity fixed at open. The mapping is never grown.
    pub fn write(&mut self, offset: u32, position: u64) -> Result<()> {
        if self.is_full() {
            return Err(LogError::Eof);
        }

        let start = self.size as usize;
        let mid = start + OFF_WIDTH as usize;
        let end = mid + POS_WIDTH as usize;

        self.mmap[start..mid].copy_from_slice(&offset.to_be_bytes());
        self.mmap[mid..end].copy_from_slice(&position.to_be_bytes());
        self.size += ENT_WIDTH;

        Ok(())
    }

    /// True if another entry would exceed the capacity
    pub fn is_full(&self) -> bool {
        self.size + ENT_WIDTH > self.capacity()
    }

    /// Path of the backing file
    pub fn name(&self) -> &Path {
        &self.path
    }

    /// Logical size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Mapped capacity in bytes
    pub fn capacity(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Number of entries written
    pub fn entries(&self) -> u64 {
        self.size / ENT_WIDTH
    }

    /// Sync the mapping, fsync, and truncate the file to its logical size
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Order matters: the mapping must be clean before the file shrinks.
    fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.mmap.flush()?;
        self.file.sync_all()?;
        self.file.set_len(self.size)?;
        self.closed = true;

        tracing::debug!("Closed index {} (size={})", self.path.display(), self.size);

        Ok(())
    }

    /// Logical size from a file length, kept within capacity and entry-aligned
    fn recover_size(path: &Path, file_len: u64, max_bytes: u64) -> u64 {
        let mut size = file_len;

        if size > max_bytes {
            tracing::warn!(
                "Index {} holds {} bytes, more than capacity {}; excess entries dropped",
                path.display(),
                size,
                max_bytes
            );
            size = max_bytes;
        }

        if size % ENT_WIDTH != 0 {
            tracing::warn!(
                "Index {} size {} is not a multiple of {}; trailing bytes ignored",
                path.display(),
                size,
                ENT_WIDTH
            );
            size -= size % ENT_WIDTH;
        }

        size
    }
}

impl Drop for Index {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.shutdown() {
                tracing::warn!("Failed to close index {} on drop: {}", self.path.display(), e);
            }
        }
    }
}
