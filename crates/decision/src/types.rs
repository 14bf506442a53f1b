//! Request, response and feedback types of the decision pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use leadgate_bandit::{BanditContext, Outcome, Prior, SelectOptions, SelectionDebug};
use leadgate_core::{BundleResult, Channel};
use leadgate_rules::{PlanContext, Scorecard};

/// One lead to qualify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub lead_id: Option<String>,
    /// Target handed to signal probes.
    pub domain: String,
    /// Pre-fetched page content for probes.
    #[serde(default)]
    pub document: Option<String>,
    /// Caller-supplied facts. Signal output is merged in under `bundle`.
    #[serde(default)]
    pub facts: Map<String, Value>,
    /// Plan whose tier policy supplies thresholds.
    #[serde(default)]
    pub plan: Option<String>,
    pub bandit: BanditContext,
    /// Restrict candidate channels for this lead.
    #[serde(default)]
    pub channels: Option<Vec<Channel>>,
    #[serde(default)]
    pub prior: Option<Prior>,
    #[serde(default)]
    pub sampling_enabled: Option<bool>,
}

impl DecisionRequest {
    pub fn new(domain: impl Into<String>, bandit: BanditContext) -> Self {
        Self {
            lead_id: bandit.lead_id.clone(),
            domain: domain.into(),
            document: None,
            facts: Map::new(),
            plan: None,
            bandit,
            channels: None,
            prior: None,
            sampling_enabled: None,
        }
    }

    /// Replace the caller facts. Non-object values are kept under `input`.
    pub fn with_facts(mut self, facts: Value) -> Self {
        self.facts = match facts {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("input".to_string(), other);
                map
            }
        };
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn with_channels(mut self, channels: impl Into<Vec<Channel>>) -> Self {
        self.channels = Some(channels.into());
        self
    }

    pub fn with_sampling(mut self, enabled: bool) -> Self {
        self.sampling_enabled = Some(enabled);
        self
    }

    /// Bandit options for this request; rule channel hints fill in when the
    /// caller did not restrict channels.
    pub(crate) fn select_options(&self, hints: &[Channel]) -> SelectOptions {
        let channels = match &self.channels {
            Some(list) => Some(list.clone()),
            None if !hints.is_empty() => Some(hints.to_vec()),
            None => None,
        };
        SelectOptions {
            channels,
            prior: self.prior,
            sampling_enabled: self.sampling_enabled,
            now: None,
        }
    }
}

/// Outcome of the channel step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelPick {
    Selected {
        channel: Channel,
        debug: SelectionDebug,
    },
    /// The lead was skipped, so no channel was chosen.
    NotNeeded,
    /// The bandit failed; `fallback` is the static default.
    Unavailable { fallback: Channel, reason: String },
}

impl ChannelPick {
    /// Channel to use, if any.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            ChannelPick::Selected { channel, .. } => Some(*channel),
            ChannelPick::Unavailable { fallback, .. } => Some(*fallback),
            ChannelPick::NotNeeded => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    #[serde(default)]
    pub lead_id: Option<String>,
    pub plan: PlanContext,
    pub bundle: BundleResult,
    pub scorecard: Scorecard,
    pub pick: ChannelPick,
    pub started_at: DateTime<Utc>,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    pub fn elapsed_ms(&self) -> i64 {
        (self.decided_at - self.started_at).num_milliseconds()
    }
}

/// Feedback from the outreach system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeEvent {
    #[serde(default)]
    pub decision_id: Option<Uuid>,
    pub bandit: BanditContext,
    pub channel: Channel,
    pub outcome: Outcome,
    /// When the outcome happened; defaults to receipt time.
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

impl OutcomeEvent {
    pub fn new(bandit: BanditContext, channel: Channel, outcome: Outcome) -> Self {
        Self {
            decision_id: None,
            bandit,
            channel,
            outcome,
            at: None,
        }
    }

    pub fn for_decision(mut self, id: Uuid) -> Self {
        self.decision_id = Some(id);
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hints_fill_in_missing_channels() {
        let req = DecisionRequest::new("acme.io", BanditContext::new("acme"));
        let opts = req.select_options(&[Channel::Phone]);
        assert_eq!(opts.channels, Some(vec![Channel::Phone]));
        assert_eq!(req.select_options(&[]).channels, None);

        let req = req.with_channels(vec![Channel::Email]);
        assert_eq!(req.select_options(&[Channel::Phone]).channels, Some(vec![Channel::Email]));
    }

    #[test]
    fn scalar_facts_are_wrapped() {
        let req = DecisionRequest::new("acme.io", BanditContext::new("acme")).with_facts(json!(3));
        assert_eq!(req.facts["input"], 3);
    }

    #[test]
    fn outcome_event_parses_from_feed_json() {
        let ev: OutcomeEvent = serde_json::from_value(json!({
            "bandit": { "tenant_id": "acme", "industry": "saas" },
            "channel": "linkedin",
            "outcome": "booked",
        }))
        .unwrap();
        assert_eq!(ev.channel, Channel::Linkedin);
        assert_eq!(ev.outcome, Outcome::Booked);
        assert!(ev.at.is_none());
    }

    #[test]
    fn pick_serializes_with_status_tag() {
        let pick = ChannelPick::Unavailable {
            fallback: Channel::Email,
            reason: "down".into(),
        };
        let v = serde_json::to_value(&pick).unwrap();
        assert_eq!(v["status"], "unavailable");
        assert_eq!(pick.channel(), Some(Channel::Email));
        assert_eq!(ChannelPick::NotNeeded.channel(), None);
    }
}
