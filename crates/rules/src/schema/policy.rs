//! TierPolicy rule kind: per-plan thresholds for tier assignment.

use serde::{Deserialize, Serialize};

use super::CommonMetadata;

/// Top-level TierPolicy document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TierPolicy {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: TierPolicySpec,
}

/// The `spec` block of a TierPolicy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TierPolicySpec {
    /// Plan (or tenant tier) this policy applies to.
    pub plan: String,
    /// Scores at or above this are hot.
    pub hot_cut: f64,
    /// Scores below this are skipped.
    pub skip_cut: f64,
    #[serde(default = "default_seed_score")]
    pub seed_score: f64,
    #[serde(default)]
    pub respect_manual_tier: bool,
}

fn default_seed_score() -> f64 {
    10.0
}

impl TierPolicy {
    pub const API_VERSION: &'static str = "v1";
    pub const KIND: &'static str = "TierPolicy";

    pub fn new(id: impl Into<String>, spec: TierPolicySpec) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata: CommonMetadata::new(id),
            spec,
        }
    }
}
