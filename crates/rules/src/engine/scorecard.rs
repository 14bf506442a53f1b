//! Scorecard output and the accumulator rules patch while running.

use serde::{Deserialize, Serialize};

use leadgate_core::{Channel, Tier};

use crate::schema::Action;

/// Final outcome of scoring one lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    /// Clamped to `[0, 100]` and rounded.
    pub score: u32,
    pub tier: Tier,
    pub channel_hints: Vec<Channel>,
    pub tags: Vec<String>,
    pub reasons: Vec<String>,
    pub blocked: bool,
    /// Labels of rules whose `then` or `if_not` branch was applied.
    pub fired_rules: Vec<String>,
    /// Last tier a rule asked for, kept for inspection even when advisory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_tier: Option<Tier>,
}

/// Mutable state threaded through every rule of every pack.
#[derive(Debug)]
pub(crate) struct Accumulator {
    score: f64,
    suggested_tier: Option<Tier>,
    tags: Vec<String>,
    reasons: Vec<String>,
    channel_hints: Vec<Channel>,
    blocked: bool,
    fired: Vec<String>,
}

impl Accumulator {
    pub(crate) fn new(seed: f64) -> Self {
        Self {
            score: if seed.is_finite() { seed } else { 0.0 },
            suggested_tier: None,
            tags: Vec::new(),
            reasons: Vec::new(),
            channel_hints: Vec::new(),
            blocked: false,
            fired: Vec::new(),
        }
    }

    /// Apply one action. Non-finite deltas and factors are ignored.
    pub(crate) fn apply(&mut self, action: &Action, weight: f64, label: String) {
        if let Some(add) = action.add {
            self.shift(add * weight);
        }
        if let Some(sub) = action.sub {
            self.shift(-(sub * weight));
        }
        if let Some(mul) = action.mul.filter(|m| m.is_finite()) {
            self.score *= mul;
        }
        if let Some(tier) = action.set_tier {
            self.suggested_tier = Some(tier);
        }
        self.tags.extend(action.tags.iter().cloned());
        self.reasons.extend(action.reasons.iter().cloned());
        self.channel_hints.extend(action.channel_hints.iter().copied());
        self.blocked |= action.block;
        self.fired.push(label);
    }

    fn shift(&mut self, delta: f64) {
        if delta.is_finite() {
            self.score += delta;
        }
    }

    pub(crate) fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Clamp, round, assign the tier and de-duplicate the lists.
    pub(crate) fn finish(self, hot_cut: f64, skip_cut: f64, respect_manual_tier: bool) -> Scorecard {
        let score = round_score(self.score);
        let tier = if self.blocked {
            Tier::Skip
        } else {
            match (respect_manual_tier, self.suggested_tier) {
                (true, Some(manual)) => manual,
                _ => threshold_tier(score, hot_cut, skip_cut),
            }
        };

        Scorecard {
            score,
            tier,
            channel_hints: dedup(self.channel_hints),
            tags: dedup(self.tags),
            reasons: dedup(self.reasons),
            blocked: self.blocked,
            fired_rules: self.fired,
            suggested_tier: self.suggested_tier,
        }
    }
}

fn round_score(raw: f64) -> u32 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u32
}

/// Threshold pass over the rounded score.
pub(crate) fn threshold_tier(score: u32, hot_cut: f64, skip_cut: f64) -> Tier {
    let s = f64::from(score);
    if s >= hot_cut {
        Tier::Hot
    } else if s < skip_cut {
        Tier::Skip
    } else {
        Tier::Warm
    }
}

/// Drop repeats, keeping the first occurrence.
fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
