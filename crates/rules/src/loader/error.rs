//! Loader failures and the per-file report returned by a directory scan.

use std::path::PathBuf;

use crate::schema::RuleKind;

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("rules directory: {0}")]
    Io(#[from] std::io::Error),

    /// Not YAML, or the header (`apiVersion`/`kind`/`metadata`) is missing.
    #[error("malformed rule yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("rule document has an empty metadata.id")]
    MissingId,

    /// The header parsed but the body does not fit the declared kind.
    #[error("rule '{id}' does not match its kind: {reason}")]
    Shape { id: String, reason: String },

    /// Parsed, but rejected by validation. `summary` joins every error.
    #[error("rule '{id}' is invalid: {summary}")]
    Invalid { id: String, summary: String },

    /// `delete_rule` found neither `<id>.yml` nor `<id>.yaml`.
    #[error("no rule file for id '{0}'")]
    NotFound(String),

    #[error("rules watcher: {0}")]
    Watch(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// What a scan did with one file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

#[derive(Debug)]
pub enum LoadStatus {
    /// Now in the catalog, replacing any earlier document with this id.
    Registered { id: String, kind: RuleKind },
    /// Dotfiles and non-YAML files are never parsed.
    Ignored { reason: String },
    /// The previous catalog entry, if any, stays live.
    Rejected { error: String },
}
