//! Core [`RuleLoader`] struct: filesystem-backed rule loading with optional hot-reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::engine::{PlanContext, RuleEngine};
use crate::schema::{RuleDocument, RuleEnvelope, TierPolicy};
use crate::validation::validate_document;

use super::catalog::Catalog;
use super::error::{LoadResult, LoadStatus, Result, RuleError};
use super::watcher::handle_fs_event;

/// Filesystem-backed rule loader with optional hot-reload.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files, deserializes
/// them into [`RuleDocument`] instances via two-pass deserialization,
/// validates them, and keeps them in a shared [`Catalog`].
pub struct RuleLoader {
    rules_dir: PathBuf,
    catalog: Arc<RwLock<Catalog>>,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl RuleLoader {
    /// Create a new loader for the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist.
    pub fn new(rules_dir: PathBuf) -> Self {
        if !rules_dir.exists() {
            if let Err(e) = fs::create_dir_all(&rules_dir) {
                warn!(path = %rules_dir.display(), error = %e, "failed to create rules directory");
            }
        }
        Self {
            rules_dir,
            catalog: Arc::new(RwLock::new(Catalog::default())),
            _watcher: None,
        }
    }

    /// Recursively scan the rules directory and load all YAML files.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse and validation errors
    /// are reported per file but do not abort the scan.
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        self.scan_dir_recursive(&self.rules_dir, &mut results)?;
        let loaded = results
            .iter()
            .filter(|r| matches!(r.status, LoadStatus::Registered { .. }))
            .count();
        info!(path = %self.rules_dir.display(), loaded, files = results.len(), "rules directory scanned");
        Ok(results)
    }

    fn scan_dir_recursive(&self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        paths.sort();

        for path in paths {
            if is_hidden(&path) {
                if path.is_file() {
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Ignored {
                            reason: "dotfile".to_string(),
                        },
                    });
                }
                continue;
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            if !is_yaml(&path) {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Ignored {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            match self.load_file(&path) {
                Ok(doc) => {
                    let id = doc.metadata().id.clone();
                    let kind = doc.kind();
                    info!(rule_id = %id, %kind, path = %path.display(), "loaded rule");
                    self.write_catalog().insert(doc, Some(&path));
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Registered { id, kind },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Rejected {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a single YAML file without registering it.
    pub fn load_file(&self, path: &Path) -> Result<RuleDocument> {
        let contents = fs::read_to_string(path)?;
        parse_document(&contents)
    }

    /// Start a filesystem watcher.
    ///
    /// On file create/modify the document is re-parsed, validated and upserted.
    /// On file delete it is removed from the catalog. Failures are logged and
    /// the previous version is kept.
    pub fn watch(&mut self) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &catalog),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&self.rules_dir, RecursiveMode::Recursive)?;
        let _ = watcher.configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.rules_dir.display(), "watching rules directory for changes (recursive)");
        self._watcher = Some(watcher);
        Ok(())
    }

    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Shared catalog handle (live when watching).
    pub fn catalog(&self) -> Arc<RwLock<Catalog>> {
        Arc::clone(&self.catalog)
    }

    /// Point-in-time copy of the catalog.
    pub fn snapshot(&self) -> Catalog {
        self.read_catalog().clone()
    }

    /// Build an engine from the current packs (sorted by id, then by stage
    /// and priority inside the engine).
    pub fn engine(&self) -> RuleEngine {
        RuleEngine::new(self.read_catalog().packs())
    }

    pub fn policy_for(&self, plan: &str) -> Option<TierPolicy> {
        self.read_catalog().policy_for(plan)
    }

    /// Thresholds for `plan`, falling back to `default` when no policy matches.
    pub fn plan_context(&self, plan: &str, default: PlanContext) -> PlanContext {
        self.policy_for(plan)
            .map(|p| PlanContext::from(&p.spec))
            .unwrap_or(default)
    }

    /// Validate, then atomically write a document to `<id>.yml`.
    ///
    /// Writes to a dot-prefixed `.tmp` file first, then renames.
    pub fn write_document(&self, doc: &RuleDocument) -> Result<PathBuf> {
        let report = validate_document(doc);
        if !report.valid {
            return Err(RuleError::Invalid {
                id: doc.metadata().id.clone(),
                summary: report.summary(),
            });
        }

        let meta = doc.metadata();
        let final_path = self.rules_dir.join(format!("{}.yml", meta.id));
        let tmp_path = self.rules_dir.join(format!(".{}.tmp", meta.id));

        let yaml = doc.to_yaml()?;
        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, &final_path)?;

        info!(rule_id = %meta.id, kind = %doc.kind(), path = %final_path.display(), "wrote rule file");

        self.write_catalog().insert(doc.clone(), Some(&final_path));
        Ok(final_path)
    }

    /// Delete a document's file (`<id>.yml` or `<id>.yaml`) and catalog entry.
    pub fn delete_rule(&self, id: &str) -> Result<()> {
        let yml_path = self.rules_dir.join(format!("{id}.yml"));
        let yaml_path = self.rules_dir.join(format!("{id}.yaml"));

        let removed = if yml_path.exists() {
            fs::remove_file(&yml_path)?;
            true
        } else if yaml_path.exists() {
            fs::remove_file(&yaml_path)?;
            true
        } else {
            false
        };

        if !removed {
            return Err(RuleError::NotFound(id.to_string()));
        }

        self.write_catalog().remove(id);
        info!(rule_id = %id, "deleted rule");
        Ok(())
    }

    fn read_catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_catalog(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Two-pass parse (envelope, then kind-specific type) followed by validation.
pub(super) fn parse_document(contents: &str) -> Result<RuleDocument> {
    let envelope: RuleEnvelope = serde_yaml::from_str(contents)?;

    if envelope.metadata.id.is_empty() {
        return Err(RuleError::MissingId);
    }

    let doc = envelope.parse_full().map_err(|e| RuleError::Shape {
        id: envelope.metadata.id.clone(),
        reason: e.to_string(),
    })?;

    let report = validate_document(&doc);
    for w in &report.warnings {
        warn!(rule_id = %envelope.metadata.id, path = %w.path, "{}", w.message);
    }
    if !report.valid {
        return Err(RuleError::Invalid {
            id: envelope.metadata.id.clone(),
            summary: report.summary(),
        });
    }
    Ok(doc)
}

pub(super) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "yml" || e == "yaml")
        .unwrap_or(false)
}

pub(super) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
