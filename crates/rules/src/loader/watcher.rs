//! Filesystem event handler for the notify watcher (hot-reload).

use std::fs;
use std::sync::{Arc, PoisonError, RwLock};

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tracing::{info, warn};

use super::catalog::Catalog;
use super::core::{is_hidden, is_yaml, parse_document};

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(event: &Event, catalog: &Arc<RwLock<Catalog>>) {
    for path in &event.paths {
        // Dotfiles include our own `.tmp` writes.
        if !is_yaml(path) || is_hidden(path) {
            continue;
        }

        match &event.kind {
            EventKind::Create(CreateKind::File)
            | EventKind::Create(CreateKind::Any)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any) => {
                if !path.exists() {
                    // Rename away from this name.
                    remove_path(catalog, path);
                    continue;
                }
                let parsed = fs::read_to_string(path)
                    .map_err(super::RuleError::from)
                    .and_then(|contents| parse_document(&contents));
                match parsed {
                    Ok(doc) => {
                        info!(
                            rule_id = %doc.metadata().id,
                            kind = %doc.kind(),
                            path = %path.display(),
                            "hot-reloaded rule"
                        );
                        catalog
                            .write()
                            .unwrap_or_else(PoisonError::into_inner)
                            .insert(doc, Some(path));
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to reload rule, keeping previous version"
                        );
                    }
                }
            }
            EventKind::Remove(RemoveKind::File) | EventKind::Remove(RemoveKind::Any) => {
                remove_path(catalog, path);
            }
            _ => {}
        }
    }
}

fn remove_path(catalog: &Arc<RwLock<Catalog>>, path: &std::path::Path) {
    let removed = catalog
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove_path(path);
    if let Some(doc) = removed {
        info!(rule_id = %doc.metadata().id, path = %path.display(), "removed rule after file deletion");
    }
}
