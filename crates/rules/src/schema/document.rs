//! Multi-kind rule document container and accessors.

use super::{CommonMetadata, RuleKind, RulePack, TierPolicy};

/// A fully deserialized rule document of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDocument {
    /// Ordered condition → action rules.
    Pack(RulePack),
    /// Per-plan tier thresholds.
    Policy(TierPolicy),
}

impl RuleDocument {
    /// Get the document's metadata regardless of kind.
    pub fn metadata(&self) -> &CommonMetadata {
        match self {
            RuleDocument::Pack(pack) => &pack.metadata,
            RuleDocument::Policy(policy) => &policy.metadata,
        }
    }

    /// Get the document kind.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleDocument::Pack(_) => RuleKind::RulePack,
            RuleDocument::Policy(_) => RuleKind::TierPolicy,
        }
    }

    pub fn as_pack(&self) -> Option<&RulePack> {
        match self {
            RuleDocument::Pack(pack) => Some(pack),
            _ => None,
        }
    }

    pub fn as_policy(&self) -> Option<&TierPolicy> {
        match self {
            RuleDocument::Policy(policy) => Some(policy),
            _ => None,
        }
    }

    /// Serialize this document to YAML, delegating to the inner type.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        match self {
            RuleDocument::Pack(p) => serde_yaml::to_string(p),
            RuleDocument::Policy(p) => serde_yaml::to_string(p),
        }
    }
}
