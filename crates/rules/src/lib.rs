//! Declarative lead-scoring rules.
//!
//! This crate provides:
//! - YAML rule documents (`RulePack`, `TierPolicy`) with serde deserialization
//! - A pure, total condition evaluator over JSON fact objects
//! - The rule engine that turns facts into a [`Scorecard`]
//! - Registration-time validation with "did you mean" suggestions
//! - Filesystem loader with hot-reload via `notify` watcher

pub mod engine;
pub mod evaluator;
pub mod loader;
pub mod schema;
pub mod validation;

pub use engine::{PlanContext, RuleEngine, Scorecard};
pub use loader::{RuleError, RuleLoader};
