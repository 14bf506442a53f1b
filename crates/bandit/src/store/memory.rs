//! In-process store backed by a tokio `RwLock`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BanditStore;
use crate::error::StoreError;
use crate::stats::SegmentStats;

#[derive(Debug, Default)]
pub struct MemoryStore {
    segments: RwLock<HashMap<String, SegmentStats>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored segment.
    pub async fn snapshot(&self) -> HashMap<String, SegmentStats> {
        self.segments.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.segments.read().await.len()
    }
}

#[async_trait]
impl BanditStore for MemoryStore {
    async fn load_segment(&self, key: &str) -> Result<Option<SegmentStats>, StoreError> {
        Ok(self.segments.read().await.get(key).cloned())
    }

    async fn save_segment(&self, stats: &SegmentStats) -> Result<(), StoreError> {
        self.segments
            .write()
            .await
            .insert(stats.key.clone(), stats.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Outcome, Prior};
    use chrono::Utc;
    use leadgate_core::Channel;

    #[tokio::test]
    async fn missing_segment_is_none() {
        let store = MemoryStore::new();
        assert!(store.load_segment("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_is_identical() {
        let store = MemoryStore::new();
        let mut seg = SegmentStats::new("acme:01");
        seg.arm_mut(Channel::Email, Prior::default())
            .observe(Outcome::Success, Utc::now());
        store.save_segment(&seg).await.unwrap();

        let loaded = store.load_segment("acme:01").await.unwrap().unwrap();
        assert_eq!(loaded, seg);
        store.save_segment(&loaded).await.unwrap();
        assert_eq!(store.load_segment("acme:01").await.unwrap().unwrap(), seg);
        assert_eq!(store.len().await, 1);
        store.flush().await.unwrap();
    }
}
