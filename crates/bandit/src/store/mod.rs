//! Persistence boundary for per-segment arm statistics.
//!
//! Load and save are separate calls and are not atomic as a pair, so two
//! concurrent updates of one segment can lose an update. Callers that need
//! stronger guarantees must serialize writes per key themselves.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::stats::SegmentStats;

/// Storage backend for segment statistics.
#[async_trait]
pub trait BanditStore: Send + Sync {
    /// Load a segment; `None` when it has never been saved.
    async fn load_segment(&self, key: &str) -> Result<Option<SegmentStats>, StoreError>;

    /// Persist a segment under `stats.key`, replacing any previous version.
    async fn save_segment(&self, stats: &SegmentStats) -> Result<(), StoreError>;

    /// Push buffered writes to durable storage.
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
