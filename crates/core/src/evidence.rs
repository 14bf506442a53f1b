//! Scored evidence, per-signal results and the aggregated bundle.
//!
//! A probe produces one [`SignalResult`] made of zero or more [`Evidence`]
//! units. The runner folds every result into a [`BundleResult`] whose
//! `overall` score is the weight-normalized mean of the component scores.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// A single scored, labeled, sourced fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub id: String,
    /// Contribution in `[0, 1]`.
    pub value: f64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Evidence {
    pub fn new(id: impl Into<String>, value: f64, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: clamp01(value),
            label: label.into(),
            source: None,
            meta: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Outcome of one signal probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub id: String,
    /// `clamp01(Σ evidence.value)`, or 0 on failure.
    pub score: f64,
    pub weight: f64,
    pub evidences: Vec<Evidence>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SignalResult {
    /// Build a successful result; the score is derived from the evidence.
    pub fn from_evidences(id: impl Into<String>, weight: f64, evidences: Vec<Evidence>) -> Self {
        let score = clamp01(evidences.iter().map(|e| e.value).sum());
        Self {
            id: id.into(),
            score,
            weight,
            evidences,
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// Neutral-low result for a probe that failed or timed out.
    pub fn failed(id: impl Into<String>, weight: f64, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score: 0.0,
            weight,
            evidences: Vec::new(),
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Weight usable in aggregation: non-finite or negative weights count as zero.
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// All signal results of one run plus their weighted aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleResult {
    pub by_id: HashMap<String, SignalResult>,
    /// Results in provider order.
    pub results: Vec<SignalResult>,
    /// `clamp01(Σ score·weight / Σ weight)`.
    pub overall: f64,
    pub timestamp: DateTime<Utc>,
}

impl BundleResult {
    pub fn from_results(results: Vec<SignalResult>) -> Self {
        let overall = weighted_mean(&results);
        let by_id = results
            .iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();
        Self {
            by_id,
            results,
            overall,
            timestamp: Utc::now(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&SignalResult> {
        self.by_id.get(id)
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }

    /// Render the bundle as a fact object for the rule engine.
    ///
    /// Shape: `{"overall": x, "signals": {id: {"score", "weight", "error", "evidence": [labels]}}}`.
    pub fn to_facts(&self) -> Value {
        let mut signals = Map::new();
        for r in &self.results {
            signals.insert(
                r.id.clone(),
                json!({
                    "score": r.score,
                    "weight": r.weight,
                    "error": r.error,
                    "evidence": r.evidences.iter().map(|e| e.label.clone()).collect::<Vec<_>>(),
                }),
            );
        }
        json!({
            "overall": self.overall,
            "signals": Value::Object(signals),
        })
    }
}

fn weighted_mean(results: &[SignalResult]) -> f64 {
    let (num, den) = results.iter().fold((0.0, 0.0), |(num, den), r| {
        let w = r.effective_weight();
        (num + clamp01(r.score) * w, den + w)
    });
    if den > 0.0 {
        clamp01(num / den)
    } else {
        0.0
    }
}
