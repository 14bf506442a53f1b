//! Bandit context and segment-key derivation.

use serde::{Deserialize, Serialize};

use crate::stable_hash::stable_hash64;

/// Seed mixed into every segment hash. Changing it orphans stored segments.
const SEGMENT_SEED: u64 = 0x6c65_6164_6761_7465;

/// Bucket count for industry and tag hashing.
const BUCKETS: u64 = 64;

/// Placeholder for missing or blank fields.
const PLACEHOLDER: &str = "_";

const TENANT_MAX: usize = 32;
const TAGS_MAX: usize = 3;

/// Coarse description of who is being contacted.
///
/// Only used to derive a segment key; `user_id` and `lead_id` are carried for
/// logging and never influence the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BanditContext {
    pub tenant_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub size_tier: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub signal_tags: Vec<String>,
}

impl BanditContext {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            ..Self::default()
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_size_tier(mut self, size: impl Into<String>) -> Self {
        self.size_tier = Some(size.into());
        self
    }

    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signal_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_lead(mut self, lead_id: impl Into<String>) -> Self {
        self.lead_id = Some(lead_id.into());
        self
    }

    /// Stable segment key, rendered `"{tenant_token}:{hash:016x}"`.
    pub fn segment_key(&self) -> String {
        segment_key(self)
    }
}

/// Derive the segment key for `ctx`.
///
/// The readable prefix is a sanitized tenant token. The hash covers the raw
/// (trimmed) tenant, size tier and timezone, an industry bucket and a bucket
/// of up to three sorted, de-duplicated signal tags, so tenants that sanitize
/// to the same token still get distinct keys. Blank fields degrade to the
/// placeholder rather than failing.
pub fn segment_key(ctx: &BanditContext) -> String {
    let prefix = token(&ctx.tenant_id, TENANT_MAX);
    let industry = ctx
        .industry
        .as_deref()
        .map(normalize)
        .filter(|s| !s.is_empty())
        .map(|s| format!("i{}", stable_hash64(SEGMENT_SEED, &s) % BUCKETS))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let tags = tag_bucket(&ctx.signal_tags);

    let material = [
        raw(Some(ctx.tenant_id.as_str())),
        industry.as_str(),
        raw(ctx.size_tier.as_deref()),
        raw(ctx.timezone.as_deref()),
        tags.as_str(),
    ]
    .iter()
    .map(|part| format!("{}:{part}", part.len()))
    .collect::<Vec<_>>()
    .join("|");
    format!("{prefix}:{:016x}", stable_hash64(SEGMENT_SEED, &material))
}

/// Trimmed value, or the placeholder when missing or blank.
fn raw(field: Option<&str>) -> &str {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER)
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Display token: lowercase, keep `[a-z0-9_-]`, map anything else to `_`,
/// truncate.
fn token(raw: &str, max: usize) -> String {
    let cleaned: String = normalize(raw)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(max)
        .collect();
    if cleaned.chars().all(|c| c == '_') {
        PLACEHOLDER.to_string()
    } else {
        cleaned
    }
}

fn tag_bucket(tags: &[String]) -> String {
    let mut cleaned: Vec<String> = tags
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.is_empty())
        .collect();
    cleaned.sort();
    cleaned.dedup();
    cleaned.truncate(TAGS_MAX);
    if cleaned.is_empty() {
        return PLACEHOLDER.to_string();
    }
    format!("t{}", stable_hash64(SEGMENT_SEED, &cleaned.join(",")) % BUCKETS)
}
