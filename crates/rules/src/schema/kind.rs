//! Rule kind enum for two-pass deserialization dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported rule kinds for two-pass deserialization dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    RulePack,
    TierPolicy,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::RulePack => write!(f, "RulePack"),
            RuleKind::TierPolicy => write!(f, "TierPolicy"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "RulePack" => Ok(RuleKind::RulePack),
            "TierPolicy" => Ok(RuleKind::TierPolicy),
            other => Err(format!("unknown rule kind: '{}'", other)),
        }
    }
}
