//! Thompson-sampling channel selection over per-segment Beta posteriors.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use leadgate_core::{BanditConfig, Channel};

use crate::context::BanditContext;
use crate::error::Result;
use crate::rng::{RandomSource, StdRandom};
use crate::sampling;
use crate::stats::{ArmStats, Outcome, Prior, SegmentStats};
use crate::store::BanditStore;

/// Multiplier applied to arms contacted within the cooldown window.
pub const COOLDOWN_DAMPING: f64 = 0.7;

/// Cooldowns are capped at roughly 292 years to stay inside chrono's range.
const MAX_COOLDOWN_MS: i64 = i64::MAX / 1_000_000;

/// Per-call overrides for [`ChannelBandit::select`].
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Candidate channels in tie-break order. `None` uses the configured set.
    pub channels: Option<Vec<Channel>>,
    /// Prior for arms this segment has never seen.
    pub prior: Option<Prior>,
    pub sampling_enabled: Option<bool>,
    /// Clock override.
    pub now: Option<DateTime<Utc>>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(mut self, channels: impl Into<Vec<Channel>>) -> Self {
        self.channels = Some(channels.into());
        self
    }

    pub fn with_prior(mut self, prior: Prior) -> Self {
        self.prior = Some(prior);
        self
    }

    pub fn with_sampling(mut self, enabled: bool) -> Self {
        self.sampling_enabled = Some(enabled);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }
}

/// Diagnostics for one candidate arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmDebug {
    pub channel: Channel,
    /// Sample (or mean) before cooldown damping.
    pub raw: f64,
    /// Value that competed for the pick.
    pub effective: f64,
    pub cooled_down: bool,
    pub stats: ArmStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDebug {
    pub segment_key: String,
    pub sampled: bool,
    pub arms: Vec<ArmDebug>,
    /// The undamped winner differs from the final pick.
    pub cooldown_changed_winner: bool,
    /// No candidates were available and the static fallback was returned.
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub channel: Channel,
    pub debug: SelectionDebug,
}

/// Channel bandit backed by a [`BanditStore`].
pub struct ChannelBandit {
    store: Arc<dyn BanditStore>,
    config: BanditConfig,
    rng: Mutex<Box<dyn RandomSource>>,
}

impl ChannelBandit {
    pub fn new(store: Arc<dyn BanditStore>, config: BanditConfig) -> Self {
        Self::with_random(store, config, Box::new(StdRandom::from_entropy()))
    }

    /// Use an explicit random source, e.g. a seeded one for replays.
    pub fn with_random(
        store: Arc<dyn BanditStore>,
        config: BanditConfig,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            store,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn BanditStore> {
        &self.store
    }

    /// Channel returned when there is nothing to choose from.
    pub fn fallback_channel(&self) -> Channel {
        self.config
            .channels
            .first()
            .copied()
            .unwrap_or(Channel::DEFAULTS[0])
    }

    fn config_prior(&self) -> Prior {
        Prior::new(self.config.prior_alpha, self.config.prior_beta)
    }

    /// Pick a channel for `ctx`.
    ///
    /// Arms missing from the stored segment are scored from the prior but not
    /// written back; only [`record`](Self::record) persists state. The segment
    /// is loaded even when there are no candidates, so store failures always
    /// surface.
    pub async fn select(&self, ctx: &BanditContext, options: &SelectOptions) -> Result<Selection> {
        let key = ctx.segment_key();
        let candidates = dedup_channels(
            options
                .channels
                .as_deref()
                .unwrap_or(self.config.channels.as_slice()),
        );

        let segment = self
            .store
            .load_segment(&key)
            .await?
            .unwrap_or_else(|| SegmentStats::new(key.clone()));

        if candidates.is_empty() {
            let channel = self.fallback_channel();
            debug!(segment = %key, %channel, "no candidate channels, using fallback");
            return Ok(Selection {
                channel,
                debug: SelectionDebug {
                    segment_key: key,
                    sampled: false,
                    arms: Vec::new(),
                    cooldown_changed_winner: false,
                    fallback: true,
                },
            });
        }

        let prior = options.prior.unwrap_or_else(|| self.config_prior());
        let sampled = options.sampling_enabled.unwrap_or(self.config.sampling_enabled);
        let now = options.now.unwrap_or_else(Utc::now);
        let cooldown_ms = i64::try_from(self.config.min_cooldown_ms)
            .unwrap_or(i64::MAX)
            .min(MAX_COOLDOWN_MS);
        let cooldown = Duration::milliseconds(cooldown_ms);

        let stats: Vec<ArmStats> = candidates
            .iter()
            .map(|c| segment.arm_or_prior(*c, prior))
            .collect();

        let raws: Vec<f64> = if sampled {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            stats
                .iter()
                .map(|s| sampling::beta(s.alpha, s.beta, rng.as_mut()))
                .collect()
        } else {
            stats.iter().map(ArmStats::mean).collect()
        };

        let arms: Vec<ArmDebug> = candidates
            .iter()
            .zip(stats)
            .zip(raws)
            .map(|((channel, stats), raw)| {
                let cooled_down = in_cooldown(&stats, now, cooldown);
                let effective = if cooled_down { raw * COOLDOWN_DAMPING } else { raw };
                ArmDebug {
                    channel: *channel,
                    raw,
                    effective,
                    cooled_down,
                    stats,
                }
            })
            .collect();

        let winner = argmax(arms.iter().map(|a| a.effective));
        let undamped = argmax(arms.iter().map(|a| a.raw));
        let channel = arms[winner].channel;
        let cooldown_changed_winner = winner != undamped;

        debug!(
            segment = %key,
            %channel,
            sampled,
            cooldown_changed_winner,
            "channel selected"
        );

        Ok(Selection {
            channel,
            debug: SelectionDebug {
                segment_key: key,
                sampled,
                arms,
                cooldown_changed_winner,
                fallback: false,
            },
        })
    }

    /// Record an outcome at the current time.
    pub async fn record(
        &self,
        ctx: &BanditContext,
        channel: Channel,
        outcome: Outcome,
    ) -> Result<ArmStats> {
        self.record_at(ctx, channel, outcome, Utc::now()).await
    }

    /// Load, update and save the arm for `channel` in `ctx`'s segment.
    ///
    /// Not atomic: a concurrent record on the same segment between the load
    /// and the save is overwritten.
    pub async fn record_at(
        &self,
        ctx: &BanditContext,
        channel: Channel,
        outcome: Outcome,
        at: DateTime<Utc>,
    ) -> Result<ArmStats> {
        let key = ctx.segment_key();
        let mut segment = self
            .store
            .load_segment(&key)
            .await?
            .unwrap_or_else(|| SegmentStats::new(key.clone()));

        let arm = segment.arm_mut(channel, self.config_prior());
        arm.observe(outcome, at);
        let updated = arm.clone();

        self.store.save_segment(&segment).await?;
        info!(
            segment = %key,
            %channel,
            %outcome,
            trials = updated.trials,
            successes = updated.successes,
            lead_id = ctx.lead_id.as_deref().unwrap_or(""),
            "bandit outcome recorded"
        );
        Ok(updated)
    }
}

fn dedup_channels(channels: &[Channel]) -> Vec<Channel> {
    let mut out: Vec<Channel> = Vec::with_capacity(channels.len());
    for c in channels {
        if !out.contains(c) {
            out.push(*c);
        }
    }
    out
}

/// Future timestamps count as cooled.
fn in_cooldown(stats: &ArmStats, now: DateTime<Utc>, cooldown: Duration) -> bool {
    match stats.last_at {
        Some(last) => now.signed_duration_since(last) < cooldown,
        None => false,
    }
}

/// Index of the largest value; the first one wins ties and NaN never wins.
fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}
