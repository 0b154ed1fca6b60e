//! Segment
//!
//! Binds one store and one index that share a base offset.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, SegmentConfig};
use crate::error::{LogError, Result};
use crate::record::Record;

use super::{EntrySelector, Index, Store, INDEX_SUFFIX, STORE_SUFFIX};

/// One on-disk segment of the log
///
/// ## Lifecycle:
/// - `open` creates or reopens `<base_offset>.store` and `<base_offset>.index`
/// - `append`/`read` while active; once `is_maxed` the owner should roll
///   over to a new segment (appends are still accepted here if capacity remains)
/// - `close` or `remove` consume the segment
///
/// ## Concurrency:
/// - `append` takes `&mut self`: one writer per segment
/// - `read`/`is_maxed` take `&self` and may run from many threads
pub struct Segment {
    /// Store holding the serialized records
    store: Store,

    /// Index mapping relative offsets to store positions
    index: Index,

    /// Absolute offset of the first record in this segment
    base_offset: u64,

    /// Offset the next appended record will get
    next_offset: u64,

    /// Rollover limits
    config: SegmentConfig,
}

impl Segment {
    /// Open or create the segment starting at `base_offset` in `dir`
    ///
    /// On startup:
    /// 1. Validate limits and create the directory if missing
    /// 2. Open the store (size recovered from file length)
    /// 3. Open the index (size recovered, file pre-sized to capacity)
    /// 4. Resume `next_offset` after the last indexed entry
    pub fn open(dir: &Path, base_offset: u64, config: &Config) -> Result<Self> {
        // Step 1: Validate limits, ensure directory exists
        config.validate()?;
        fs::create_dir_all(dir)?;

        // Step 2: Open store
        let store = Store::open(&Self::file_path(dir, base_offset, STORE_SUFFIX))?;

        // Step 3: Open index
        let index = Index::open(
            &Self::file_path(dir, base_offset, INDEX_SUFFIX),
            config.segment.max_index_bytes,
        )?;

        // Step 4: Resume offset assignment
        let next_offset = base_offset + index.entries();

        tracing::debug!(
            "Opened segment {} in {} (next_offset={}, store_size={})",
            base_offset,
            dir.display(),
            next_offset,
            store.size()
        );

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config: config.segment,
        })
    }

    /// Append a record and return the absolute offset assigned to it
    ///
    /// Steps:
    /// 1. Refuse with `LogError::Eof` if the index has no room left
    /// 2. Stamp the record with `next_offset` and serialize it
    /// 3. Append the frame to the store
    /// 4. Index the frame position under the relative offset
    ///
    /// Checking the index first means a full segment never leaves a store
    /// frame behind without an index entry. On any error `next_offset`
    /// is unchanged.
    pub fn append(&mut self, record: &mut Record) -> Result<u64> {
        // Step 1: Capacity check before any bytes are written
        if self.index.is_full() {
            return Err(LogError::Eof);
        }

        let offset = self.next_offset;
        let relative = u32::try_from(offset - self.base_offset).map_err(|_| LogError::Eof)?;

        // Step 2: Serialize
        record.offset = offset;
        let payload = record.serialize()?;

        // Step 3: Store
        let (written, position) = self.store.append(&payload)?;

        // Step 4: Index
        self.index.write(relative, position)?;

        self.next_offset += 1;

        tracing::trace!(
            "Appended offset {} to segment {} (position={}, written={})",
            offset,
            self.base_offset,
            position,
            written
        );

        Ok(offset)
    }

    /// Read the record at absolute `offset`
    ///
    /// Returns `LogError::Eof` if the offset is not in this segment.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let relative = offset.checked_sub(self.base_offset).ok_or(LogError::Eof)?;

        let (_, position) = self.index.read(EntrySelector::At(relative))?;
        let payload = self.store.read(position)?;

        Record::deserialize(&payload)
    }

    /// True once either the store or the index has reached its limit
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    /// Close the store, then the index
    pub fn close(self) -> Result<()> {
        let base_offset = self.base_offset;

        self.store.close()?;
        self.index.close()?;

        tracing::debug!("Closed segment {}", base_offset);

        Ok(())
    }

    /// Close the segment and delete both of its files
    pub fn remove(self) -> Result<()> {
        let base_offset = self.base_offset;
        let store_path = self.store_path().to_path_buf();
        let index_path = self.index_path().to_path_buf();

        self.close()?;

        fs::remove_file(&index_path)?;
        fs::remove_file(&store_path)?;

        tracing::debug!("Removed segment {}", base_offset);

        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Absolute offset of the first record in this segment
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Offset the next appended record will get
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Path of the store file
    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    /// Path of the index file
    pub fn index_path(&self) -> &Path {
        self.index.name()
    }

    /// Rollover limits this segment was opened with
    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// "<dir>/<base_offset>.<suffix>", base offset in plain decimal
    fn file_path(dir: &Path, base_offset: u64, suffix: &str) -> PathBuf {
        dir.join(format!("{}.{}", base_offset, suffix))
    }
}
