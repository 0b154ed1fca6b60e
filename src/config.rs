//! Configuration for commitlog
//!
//! Segment capacity limits consumed by the storage core. Loading these
//! values from files or the environment is left to the caller.

use crate::error::{LogError, Result};
use crate::storage::ENT_WIDTH;

/// Main configuration for the storage core
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Per-segment rollover limits
    pub segment: SegmentConfig,
}

/// Capacity limits for a single segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    /// Store size (in bytes) at which the segment reports itself maxed
    pub max_store_bytes: u64,

    /// Index capacity (in bytes); the index file is pre-sized to this on open.
    /// Should be a multiple of the 12-byte entry width.
    pub max_index_bytes: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: 1024,
            max_index_bytes: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the limits can describe a usable segment
    ///
    /// An index capacity that is not a whole number of entries is accepted,
    /// the trailing bytes simply never get used.
    pub fn validate(&self) -> Result<()> {
        if self.segment.max_store_bytes == 0 {
            return Err(LogError::Config(
                "max_store_bytes must be greater than zero".to_string(),
            ));
        }

        if self.segment.max_index_bytes < ENT_WIDTH {
            return Err(LogError::Config(format!(
                "max_index_bytes must hold at least one {}-byte entry, got {}",
                ENT_WIDTH, self.segment.max_index_bytes
            )));
        }

        if self.segment.max_index_bytes % ENT_WIDTH != 0 {
            tracing::warn!(
                "max_index_bytes {} is not a multiple of {}; {} trailing bytes unused",
                self.segment.max_index_bytes,
                ENT_WIDTH,
                self.segment.max_index_bytes % ENT_WIDTH
            );
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store size limit (in bytes)
    pub fn max_store_bytes(mut self, bytes: u64) -> Self {
        self.config.segment.max_store_bytes = bytes;
        self
    }

    /// Set the index capacity (in bytes)
    pub fn max_index_bytes(mut self, bytes: u64) -> Self {
        self.config.segment.max_index_bytes = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
