//! Scorecard patches applied when a rule fires.

use serde::{Deserialize, Serialize};

use leadgate_core::{Channel, Tier};

/// A patch to the scorecard accumulator.
///
/// `add`/`sub` are scaled by the rule weight, `mul` is not. Lists are
/// append-only and `block` can only ever be switched on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mul: Option<f64>,
    /// Advisory tier; see `PlanContext::respect_manual_tier`.
    #[serde(default, alias = "setTier", skip_serializing_if = "Option::is_none")]
    pub set_tier: Option<Tier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    #[serde(default, alias = "channelHints", skip_serializing_if = "Vec::is_empty")]
    pub channel_hints: Vec<Channel>,
    #[serde(default)]
    pub block: bool,
}

impl Action {
    /// True when applying this action cannot change the scorecard.
    pub fn is_noop(&self) -> bool {
        self.add.is_none()
            && self.sub.is_none()
            && self.mul.is_none()
            && self.set_tier.is_none()
            && self.tags.is_empty()
            && self.reasons.is_empty()
            && self.channel_hints.is_empty()
            && !self.block
    }
}
