//! Concurrent, individually time-boxed probe execution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info, warn};

use leadgate_core::{clamp01, BundleResult, SignalResult};

use crate::context::SignalContext;
use crate::provider::{SignalError, SignalProvider};

/// Runs signal probes concurrently and aggregates their scores.
///
/// Every probe is spawned as its own task and wrapped in its own deadline
/// (`context.timeout_ms`). A probe that errors, panics or times out turns into
/// a zero-score [`SignalResult`] carrying the error message; the run itself
/// never fails and completes once every probe has finished or timed out.
pub struct SignalRunner;

impl SignalRunner {
    /// Run all providers against one shared context.
    ///
    /// `results` follow the order of `providers`, independent of completion order.
    pub async fn run_all(
        providers: &[Arc<dyn SignalProvider>],
        context: Arc<SignalContext>,
    ) -> BundleResult {
        let start = Instant::now();
        let timeout_ms = context.timeout_ms;

        let handles: Vec<_> = providers
            .iter()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let context = Arc::clone(&context);
                tokio::spawn(async move { run_one(provider.as_ref(), &context, timeout_ms).await })
            })
            .collect();

        let joined = join_all(handles).await;

        let results: Vec<SignalResult> = providers
            .iter()
            .zip(joined)
            .map(|(provider, outcome)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    let err = SignalError::Panicked(e.to_string());
                    warn!(signal = provider.id(), error = %err, "signal task aborted");
                    SignalResult::failed(provider.id(), provider.weight(), err.to_string())
                }
            })
            .collect();

        let bundle = BundleResult::from_results(results);
        info!(
            domain = %context.domain,
            signals = bundle.results.len(),
            failed = bundle.failed_count(),
            overall = bundle.overall,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "signal run complete"
        );
        bundle
    }

    /// Run providers in sequential stages.
    ///
    /// Probes within a stage run concurrently. After each stage, scores are
    /// published into the context metadata under `signals.<id>` so that later
    /// probes can read them via [`SignalContext::prior_score`]. The returned
    /// bundle aggregates every stage, in stage then provider order.
    pub async fn run_stages(
        stages: &[Vec<Arc<dyn SignalProvider>>],
        context: SignalContext,
    ) -> BundleResult {
        let mut context = context;
        let mut all = Vec::new();

        for (i, stage) in stages.iter().enumerate() {
            debug!(stage = i, probes = stage.len(), "running signal stage");
            let bundle = Self::run_all(stage, Arc::new(context.clone())).await;
            for result in &bundle.results {
                context.publish(result);
            }
            all.extend(bundle.results);
        }

        BundleResult::from_results(all)
    }
}

/// Run a single probe under its deadline and normalize whatever comes back.
async fn run_one(
    provider: &dyn SignalProvider,
    context: &SignalContext,
    timeout_ms: u64,
) -> SignalResult {
    let id = provider.id();
    let weight = provider.weight();
    let start = Instant::now();

    match tokio::time::timeout(Duration::from_millis(timeout_ms), provider.run(context)).await {
        Ok(Ok(result)) => {
            let result = normalize(result, id, weight);
            debug!(
                signal = id,
                score = result.score,
                evidences = result.evidences.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "signal finished"
            );
            result
        }
        Ok(Err(e)) => {
            warn!(signal = id, error = %e, "signal failed");
            SignalResult::failed(id, weight, e.to_string())
        }
        Err(_) => {
            let err = SignalError::Timeout(timeout_ms);
            warn!(signal = id, timeout_ms, "signal timed out");
            SignalResult::failed(id, weight, err.to_string())
        }
    }
}

/// Enforce result invariants: the provider's id and weight are authoritative,
/// the score is re-derived from evidence, and an error zeroes the result.
fn normalize(mut result: SignalResult, id: &str, weight: f64) -> SignalResult {
    result.id = id.to_string();
    result.weight = weight;
    if result.error.is_some() {
        result.score = 0.0;
        result.evidences.clear();
    } else {
        result.score = clamp01(result.evidences.iter().map(|e| e.value).sum());
    }
    result
}
