//! Signals, then rules, then channel selection for one lead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use leadgate_bandit::{ArmStats, BanditStore, ChannelBandit};
use leadgate_core::{Config, SignalConfig};
use leadgate_rules::{PlanContext, RuleEngine, RuleLoader};
use leadgate_signals::{ProviderSet, SignalContext, SignalRunner};

use crate::error::{DecisionError, Result};
use crate::types::{ChannelPick, Decision, DecisionRequest, OutcomeEvent};

/// Where rule packs and tier policies come from.
pub enum RuleSource {
    /// A fixed engine; every plan uses the default thresholds.
    Fixed(RuleEngine),
    /// Packs and policies read from a loader's catalog on every decision,
    /// so hot-reloaded edits apply to the next lead.
    Live(Arc<RuleLoader>),
}

impl RuleSource {
    fn resolve(&self, plan: Option<&str>, default: PlanContext) -> (RuleEngine, PlanContext) {
        match self {
            RuleSource::Fixed(engine) => (engine.clone(), default),
            RuleSource::Live(loader) => {
                let ctx = plan
                    .map(|p| loader.plan_context(p, default))
                    .unwrap_or(default);
                (loader.engine(), ctx)
            }
        }
    }
}

/// Qualifies leads end to end.
pub struct DecisionPipeline {
    providers: ProviderSet,
    rules: RuleSource,
    bandit: Arc<ChannelBandit>,
    signals: SignalConfig,
    default_plan: PlanContext,
    deadline: Option<Duration>,
}

impl DecisionPipeline {
    pub fn new(
        providers: ProviderSet,
        rules: RuleSource,
        bandit: Arc<ChannelBandit>,
    ) -> Self {
        Self {
            providers,
            rules,
            bandit,
            signals: SignalConfig::default(),
            default_plan: PlanContext::default(),
            deadline: None,
        }
    }

    /// Build from [`Config`]: load the rules directory (watching it when
    /// `rules.watch` is set) and wrap `store` in a bandit.
    pub fn from_config(
        config: &Config,
        providers: ProviderSet,
        store: Arc<dyn BanditStore>,
    ) -> Result<Self> {
        let mut loader = RuleLoader::new(config.rules.rules_dir.clone());
        loader.load_all()?;
        if config.rules.watch {
            loader.watch()?;
        }
        let bandit = Arc::new(ChannelBandit::new(store, config.bandit.clone()));
        Ok(Self::new(providers, RuleSource::Live(Arc::new(loader)), bandit)
            .with_signal_config(config.signals.clone())
            .with_default_plan(PlanContext::from(&config.scoring)))
    }

    pub fn with_signal_config(mut self, signals: SignalConfig) -> Self {
        self.signals = signals;
        self
    }

    /// Thresholds for requests whose plan has no tier policy.
    pub fn with_default_plan(mut self, plan: PlanContext) -> Self {
        self.default_plan = plan;
        self
    }

    /// Bound the whole decision, signals included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn bandit(&self) -> &Arc<ChannelBandit> {
        &self.bandit
    }

    /// Qualify one lead.
    ///
    /// Signal and bandit failures degrade the result instead of failing it;
    /// the only error is the overall deadline.
    pub async fn decide(&self, request: DecisionRequest) -> Result<Decision> {
        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, self.run(request))
                .await
                .map_err(|_| {
                    let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    warn!(deadline_ms = ms, "decision deadline exceeded");
                    DecisionError::DeadlineExceeded(ms)
                }),
            None => Ok(self.run(request).await),
        }
    }

    async fn run(&self, request: DecisionRequest) -> Decision {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        let mut signal_ctx = SignalContext::new(request.domain.clone()).with_config(&self.signals);
        if let Some(doc) = &request.document {
            signal_ctx = signal_ctx.with_document(doc.clone());
        }
        let bundle = SignalRunner::run_all(self.providers.providers(), Arc::new(signal_ctx)).await;

        let mut facts = request.facts.clone();
        facts
            .entry("domain")
            .or_insert_with(|| Value::String(request.domain.clone()));
        facts.insert("bundle".to_string(), bundle.to_facts());
        let facts = Value::Object(facts);

        let (engine, plan) = self.rules.resolve(request.plan.as_deref(), self.default_plan);
        let scorecard = engine.score_lead(&facts, &plan);

        let pick = if scorecard.tier.warrants_outreach() {
            let options = request.select_options(&scorecard.channel_hints);
            match self.bandit.select(&request.bandit, &options).await {
                Ok(selection) => ChannelPick::Selected {
                    channel: selection.channel,
                    debug: selection.debug,
                },
                Err(e) => {
                    let fallback = self.bandit.fallback_channel();
                    warn!(decision_id = %id, error = %e, %fallback, "channel selection failed, using fallback");
                    ChannelPick::Unavailable {
                        fallback,
                        reason: e.to_string(),
                    }
                }
            }
        } else {
            ChannelPick::NotNeeded
        };

        info!(
            decision_id = %id,
            lead_id = request.lead_id.as_deref().unwrap_or(""),
            domain = %request.domain,
            score = scorecard.score,
            tier = %scorecard.tier,
            blocked = scorecard.blocked,
            channel = pick.channel().map(|c| c.as_str()).unwrap_or("none"),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "lead decided"
        );

        Decision {
            id,
            lead_id: request.lead_id,
            plan,
            bundle,
            scorecard,
            pick,
            started_at,
            decided_at: Utc::now(),
        }
    }

    /// Feed an outreach outcome back into the bandit.
    pub async fn apply_outcome(&self, event: OutcomeEvent) -> leadgate_bandit::Result<ArmStats> {
        debug!(
            decision_id = ?event.decision_id,
            channel = %event.channel,
            outcome = %event.outcome,
            "applying outcome"
        );
        let at = event.at.unwrap_or_else(Utc::now);
        self.bandit
            .record_at(&event.bandit, event.channel, event.outcome, at)
            .await
    }
}
