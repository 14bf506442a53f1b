//! Beta posterior state per arm and per segment.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use leadgate_core::Channel;

/// Beta prior for newly created arms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    pub alpha: f64,
    pub beta: f64,
}

impl Prior {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Replace non-finite or non-positive parameters with 1.
    pub fn sanitized(self) -> Self {
        let fix = |v: f64| if v.is_finite() && v > 0.0 { v } else { 1.0 };
        Self {
            alpha: fix(self.alpha),
            beta: fix(self.beta),
        }
    }
}

impl Default for Prior {
    fn default() -> Self {
        Self { alpha: 1.0, beta: 1.0 }
    }
}

/// Observed result of an outreach attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Booked,
    Reply,
    Fail,
    Bounce,
    /// Anything that is neither a win nor a loss (opens, clicks...).
    Neutral,
}

impl Outcome {
    /// Parse an outcome label; unrecognized labels are neutral.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "success" => Outcome::Success,
            "booked" => Outcome::Booked,
            "reply" | "replied" => Outcome::Reply,
            "fail" | "failed" | "failure" => Outcome::Fail,
            "bounce" | "bounced" => Outcome::Bounce,
            _ => Outcome::Neutral,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success | Outcome::Booked | Outcome::Reply)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Outcome::Fail | Outcome::Bounce)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Booked => "booked",
            Outcome::Reply => "reply",
            Outcome::Fail => "fail",
            Outcome::Bounce => "bounce",
            Outcome::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Posterior of one channel within one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    pub alpha: f64,
    pub beta: f64,
    pub trials: u64,
    pub successes: u64,
    #[serde(default)]
    pub last_at: Option<DateTime<Utc>>,
}

impl ArmStats {
    /// An unseen arm.
    pub fn from_prior(prior: Prior) -> Self {
        let prior = prior.sanitized();
        Self {
            alpha: prior.alpha,
            beta: prior.beta,
            trials: 0,
            successes: 0,
            last_at: None,
        }
    }

    /// Posterior mean `alpha / (alpha + beta)`.
    pub fn mean(&self) -> f64 {
        let total = self.alpha + self.beta;
        if total > 0.0 && total.is_finite() {
            self.alpha / total
        } else {
            0.5
        }
    }

    pub fn is_unseen(&self) -> bool {
        self.trials == 0
    }

    /// Fold one observation into the posterior.
    pub fn observe(&mut self, outcome: Outcome, at: DateTime<Utc>) {
        self.trials += 1;
        self.last_at = Some(at);
        if outcome.is_success() {
            self.alpha += 1.0;
            self.successes += 1;
        } else if outcome.is_failure() {
            self.beta += 1.0;
        }
    }
}

/// All arms of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub key: String,
    #[serde(default)]
    pub arms: BTreeMap<Channel, ArmStats>,
}

impl SegmentStats {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            arms: BTreeMap::new(),
        }
    }

    /// The arm for `channel`, or a fresh one from `prior` (not inserted).
    pub fn arm_or_prior(&self, channel: Channel, prior: Prior) -> ArmStats {
        self.arms
            .get(&channel)
            .cloned()
            .unwrap_or_else(|| ArmStats::from_prior(prior))
    }

    pub fn arm_mut(&mut self, channel: Channel, prior: Prior) -> &mut ArmStats {
        self.arms
            .entry(channel)
            .or_insert_with(|| ArmStats::from_prior(prior))
    }
}
