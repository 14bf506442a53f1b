//! Filesystem rule loader with hot-reload via `notify` watcher.
//!
//! Scans the rules directory for RulePack and TierPolicy YAML documents,
//! validates them, and keeps an in-memory catalog that the engine is built
//! from. With watching enabled, file changes are re-applied live; a document
//! that fails to parse or validate keeps its previous version.

mod catalog;
mod core;
mod error;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::catalog::Catalog;
pub use self::core::RuleLoader;
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
