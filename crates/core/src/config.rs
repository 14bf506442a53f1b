use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub signals: SignalConfig,
    pub scoring: ScoringConfig,
    pub bandit: BanditConfig,
    pub rules: RulesConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `LEADGATE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("LEADGATE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            signals: SignalConfig::from_env_profiled(p),
            scoring: ScoringConfig::from_env_profiled(p),
            bandit: BanditConfig::from_env_profiled(p),
            rules: RulesConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  signals:  timeout_ms={}", self.signals.timeout_ms);
        tracing::info!(
            "  scoring:  seed={}, hot_cut={}, skip_cut={}, respect_manual_tier={}",
            self.scoring.seed_score,
            self.scoring.hot_cut,
            self.scoring.skip_cut,
            self.scoring.respect_manual_tier
        );
        tracing::info!(
            "  bandit:   sampling={}, cooldown_ms={}, channels={:?}, data_dir={}",
            self.bandit.sampling_enabled,
            self.bandit.min_cooldown_ms,
            self.bandit.channels,
            self.bandit.data_dir.display()
        );
        tracing::info!("  rules:    dir={}, watch={}", self.rules.rules_dir.display(), self.rules.watch);
    }

    /// Return a view safe for API responses.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "signals": { "timeout_ms": self.signals.timeout_ms },
            "scoring": {
                "seed_score": self.scoring.seed_score,
                "hot_cut": self.scoring.hot_cut,
                "skip_cut": self.scoring.skip_cut,
                "respect_manual_tier": self.scoring.respect_manual_tier,
            },
            "bandit": {
                "sampling_enabled": self.bandit.sampling_enabled,
                "min_cooldown_ms": self.bandit.min_cooldown_ms,
                "channels": self.bandit.channels,
                "prior": { "alpha": self.bandit.prior_alpha, "beta": self.bandit.prior_beta },
            },
            "rules": { "watch": self.rules.watch },
        })
    }
}

// ── Signals ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Per-probe deadline.
    pub timeout_ms: u64,
}

impl SignalConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 4_500;

    fn from_env_profiled(p: &str) -> Self {
        Self {
            timeout_ms: profiled_env_u64(p, "SIGNAL_TIMEOUT_MS", Self::DEFAULT_TIMEOUT_MS),
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { timeout_ms: Self::DEFAULT_TIMEOUT_MS }
    }
}

// ── Scoring ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub seed_score: f64,
    pub hot_cut: f64,
    pub skip_cut: f64,
    /// Let rule-driven `set_tier` survive the threshold pass.
    pub respect_manual_tier: bool,
}

impl ScoringConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            seed_score: profiled_env_f64(p, "SCORE_SEED", d.seed_score),
            hot_cut: profiled_env_f64(p, "SCORE_HOT_CUT", d.hot_cut),
            skip_cut: profiled_env_f64(p, "SCORE_SKIP_CUT", d.skip_cut),
            respect_manual_tier: profiled_env_bool(p, "SCORE_RESPECT_MANUAL_TIER", d.respect_manual_tier),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            seed_score: 10.0,
            hot_cut: 70.0,
            skip_cut: 40.0,
            respect_manual_tier: false,
        }
    }
}

// ── Bandit ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanditConfig {
    /// Thompson sampling gate; off means posterior-mean exploitation.
    pub sampling_enabled: bool,
    pub min_cooldown_ms: u64,
    /// Default candidate channels, in tie-break order.
    pub channels: Vec<Channel>,
    pub prior_alpha: f64,
    pub prior_beta: f64,
    pub data_dir: PathBuf,
}

impl BanditConfig {
    pub const DEFAULT_COOLDOWN_MS: u64 = 6 * 60 * 60 * 1000;

    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        let channels = match profiled_env_opt(p, "BANDIT_CHANNELS") {
            Some(raw) => match Channel::parse_list(&raw) {
                Ok(list) if !list.is_empty() => list,
                Ok(_) => d.channels.clone(),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "invalid BANDIT_CHANNELS, using defaults");
                    d.channels.clone()
                }
            },
            None => d.channels.clone(),
        };
        Self {
            sampling_enabled: profiled_env_bool(p, "BANDIT_SAMPLING_ENABLED", d.sampling_enabled),
            min_cooldown_ms: profiled_env_u64(p, "BANDIT_MIN_COOLDOWN_MS", d.min_cooldown_ms),
            channels,
            prior_alpha: positive_or(profiled_env_f64(p, "BANDIT_PRIOR_ALPHA", d.prior_alpha), d.prior_alpha),
            prior_beta: positive_or(profiled_env_f64(p, "BANDIT_PRIOR_BETA", d.prior_beta), d.prior_beta),
            data_dir: PathBuf::from(profiled_env_or(p, "BANDIT_DATA_DIR", "data/bandit")),
        }
    }
}

fn positive_or(v: f64, default: f64) -> f64 {
    if v > 0.0 { v } else { default }
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            sampling_enabled: true,
            min_cooldown_ms: Self::DEFAULT_COOLDOWN_MS,
            channels: Channel::DEFAULTS.to_vec(),
            prior_alpha: 1.0,
            prior_beta: 1.0,
            data_dir: PathBuf::from("data/bandit"),
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub rules_dir: PathBuf,
    /// Hot-reload rule packs on file changes.
    pub watch: bool,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            rules_dir: PathBuf::from(profiled_env_or(p, "RULES_DIR", "data/rules")),
            watch: profiled_env_bool(p, "RULES_WATCH", false),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from("data/rules"),
            watch: false,
        }
    }
}
