//! Immutable per-run input handed to every signal probe.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use leadgate_core::config::SignalConfig;
use leadgate_core::SignalResult;

/// Input to a probe: the target, optional pre-fetched content, the per-probe
/// deadline and metadata carried over from earlier signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContext {
    /// Target identifier, usually the company domain.
    pub domain: String,
    /// Pre-fetched document content (e.g. homepage HTML), if any.
    #[serde(default)]
    pub document: Option<String>,
    /// Per-probe deadline in milliseconds.
    pub timeout_ms: u64,
    /// Free-form metadata; earlier stages publish their scores under `signals`.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SignalContext {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            document: None,
            timeout_ms: SignalConfig::DEFAULT_TIMEOUT_MS,
            metadata: Map::new(),
        }
    }

    pub fn with_config(mut self, config: &SignalConfig) -> Self {
        self.timeout_ms = config.timeout_ms;
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Score published by an earlier stage for signal `id`.
    pub fn prior_score(&self, id: &str) -> Option<f64> {
        self.metadata
            .get("signals")?
            .get(id)?
            .get("score")?
            .as_f64()
    }

    /// Publish a finished result so later stages can build on it.
    pub(crate) fn publish(&mut self, result: &SignalResult) {
        let signals = self
            .metadata
            .entry("signals")
            .or_insert_with(|| Value::Object(Map::new()));
        if !signals.is_object() {
            *signals = Value::Object(Map::new());
        }
        if let Value::Object(map) = signals {
            map.insert(
                result.id.clone(),
                json!({ "score": result.score, "error": result.error }),
            );
        }
    }
}
