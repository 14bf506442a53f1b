//! Directory-backed store: one JSON document per segment.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use super::BanditStore;
use crate::error::StoreError;
use crate::stable_hash::stable_hash64;
use crate::stats::SegmentStats;

/// Writes go to a uniquely named, dot-prefixed temp file and are renamed into
/// place, so a reader never observes a partial document and concurrent saves
/// of one segment resolve as last write wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for `key`. Sanitizing can map distinct keys to one name, so a
    /// short hash of the raw key is appended.
    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .take(96)
            .collect();
        let tag = stable_hash64(0, key) & 0xffff_ffff;
        self.dir.join(format!("{safe}.{tag:08x}.json"))
    }
}

#[async_trait]
impl BanditStore for FileStore {
    async fn load_segment(&self, key: &str) -> Result<Option<SegmentStats>, StoreError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stats: SegmentStats = serde_json::from_slice(&bytes)?;
        if stats.key != key {
            warn!(path = %path.display(), expected = %key, found = %stats.key, "segment file key mismatch");
            return Ok(None);
        }
        Ok(Some(stats))
    }

    async fn save_segment(&self, stats: &SegmentStats) -> Result<(), StoreError> {
        let path = self.path_for(&stats.key);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("segment.json");
        let tmp = self
            .dir
            .join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

        let json = serde_json::to_vec_pretty(stats)?;
        let written = match fs::write(&tmp, json).await {
            Ok(()) => fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(segment = %stats.key, path = %path.display(), "segment saved");
        Ok(())
    }
}
