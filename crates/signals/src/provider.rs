//! The capability every signal probe implements.

use async_trait::async_trait;

use leadgate_core::SignalResult;

use crate::context::SignalContext;

/// Trait for signal probes: each enrichment source implements this.
///
/// Probes live outside this crate (HTML heuristics, vendor lookups, DNS
/// checks). The runner only relies on this shape; retries, if any, are the
/// probe's own concern.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Stable identifier, used as the key in the bundle and in rule facts.
    fn id(&self) -> &str;

    /// Relative weight in the bundle's weighted mean.
    fn weight(&self) -> f64 {
        1.0
    }

    /// Run the probe against the context.
    async fn run(&self, context: &SignalContext) -> Result<SignalResult, SignalError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("signal failed: {0}")]
    Failed(String),

    #[error("signal timed out after {0}ms")]
    Timeout(u64),

    #[error("signal panicked: {0}")]
    Panicked(String),

    #[error("invalid provider '{id}': {reason}")]
    InvalidProvider { id: String, reason: String },
}
