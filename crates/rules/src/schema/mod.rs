//! YAML DSL schema types with serde deserialization.
//!
//! Defines the type hierarchy for rule documents:
//! - `RuleEnvelope`: lightweight first-pass header (apiVersion, kind, metadata)
//! - `RuleDocument`: enum dispatching to kind-specific types
//! - `RulePack`: ordered condition → action rules, grouped by stage
//! - `TierPolicy`: per-plan score thresholds

mod action;
mod condition;
mod document;
mod envelope;
mod kind;
mod metadata;
mod operator;
mod pack;
mod policy;

pub use action::*;
pub use condition::*;
pub use document::*;
pub use envelope::*;
pub use kind::*;
pub use metadata::*;
pub use operator::*;
pub use pack::*;
pub use policy::*;

#[cfg(test)]
mod tests;
