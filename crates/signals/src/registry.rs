//! Registration-time validation for signal providers.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::provider::{SignalError, SignalProvider};

/// Ordered, validated set of providers.
///
/// Provider shape is checked once here (non-empty unique id, finite
/// non-negative weight) so nothing has to be re-checked on every run.
#[derive(Default, Clone)]
pub struct ProviderSet {
    providers: Vec<Arc<dyn SignalProvider>>,
    ids: HashSet<String>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, rejecting malformed or duplicate ones.
    pub fn register(&mut self, provider: Arc<dyn SignalProvider>) -> Result<(), SignalError> {
        let id = provider.id().trim().to_string();
        if id.is_empty() {
            return Err(SignalError::InvalidProvider {
                id,
                reason: "id must not be empty".to_string(),
            });
        }
        let weight = provider.weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(SignalError::InvalidProvider {
                id,
                reason: format!("weight must be finite and >= 0, got {weight}"),
            });
        }
        if !self.ids.insert(id.clone()) {
            return Err(SignalError::InvalidProvider {
                id,
                reason: "duplicate id".to_string(),
            });
        }
        info!(signal = %id, weight, "registered signal provider");
        self.providers.push(provider);
        Ok(())
    }

    pub fn with(mut self, provider: Arc<dyn SignalProvider>) -> Result<Self, SignalError> {
        self.register(provider)?;
        Ok(self)
    }

    pub fn providers(&self) -> &[Arc<dyn SignalProvider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet")
            .field("ids", &self.providers.iter().map(|p| p.id()).collect::<Vec<_>>())
            .finish()
    }
}
