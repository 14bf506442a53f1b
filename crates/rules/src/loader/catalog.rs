//! In-memory catalog of loaded rule documents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::schema::{RuleDocument, RulePack, TierPolicy};

/// Loaded documents keyed by `metadata.id`, plus the file each came from.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    documents: HashMap<String, RuleDocument>,
    sources: HashMap<PathBuf, String>,
}

impl Catalog {
    /// Insert or replace a document. `source` records the file it came from so
    /// a later delete event can find it even when the file name differs from
    /// the id.
    pub(crate) fn insert(&mut self, doc: RuleDocument, source: Option<&Path>) {
        let id = doc.metadata().id.clone();
        if let Some(path) = source {
            // A file whose document changed id drops the old entry.
            if let Some(previous) = self.sources.insert(path.to_path_buf(), id.clone()) {
                if previous != id && !self.sources.values().any(|v| *v == previous) {
                    self.documents.remove(&previous);
                }
            }
        }
        self.documents.insert(id, doc);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<RuleDocument> {
        self.sources.retain(|_, v| v != id);
        self.documents.remove(id)
    }

    pub(crate) fn remove_path(&mut self, path: &Path) -> Option<RuleDocument> {
        let id = self.sources.remove(path)?;
        if self.sources.values().any(|v| *v == id) {
            return None;
        }
        self.documents.remove(&id)
    }

    pub fn get(&self, id: &str) -> Option<&RuleDocument> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All rule packs, sorted by id so engine registration order is stable.
    pub fn packs(&self) -> Vec<RulePack> {
        let mut packs: Vec<RulePack> = self
            .documents
            .values()
            .filter_map(|d| d.as_pack().cloned())
            .collect();
        packs.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        packs
    }

    /// All tier policies, sorted by id.
    pub fn policies(&self) -> Vec<TierPolicy> {
        let mut policies: Vec<TierPolicy> = self
            .documents
            .values()
            .filter_map(|d| d.as_policy().cloned())
            .collect();
        policies.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        policies
    }

    /// The enabled policy for `plan` (case-insensitive). When several match,
    /// the one with the smallest id wins.
    pub fn policy_for(&self, plan: &str) -> Option<TierPolicy> {
        self.policies()
            .into_iter()
            .find(|p| p.metadata.enabled && p.spec.plan.eq_ignore_ascii_case(plan))
    }
}
