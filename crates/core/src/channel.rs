use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Outreach channel a lead can be contacted through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Linkedin,
    Phone,
    Sms,
    Whatsapp,
}

impl Channel {
    /// Candidate set used when neither config nor caller narrows it.
    pub const DEFAULTS: [Channel; 3] = [Channel::Email, Channel::Linkedin, Channel::Phone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Linkedin => "linkedin",
            Channel::Phone => "phone",
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
        }
    }

    /// Parse a comma-separated list, skipping blanks. Fails on the first unknown entry.
    pub fn parse_list(raw: &str) -> Result<Vec<Channel>, CoreError> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "linkedin" => Ok(Channel::Linkedin),
            "phone" | "call" => Ok(Channel::Phone),
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::Whatsapp),
            other => Err(CoreError::UnknownChannel(other.to_string())),
        }
    }
}

/// Qualification outcome assigned to a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hot,
    Warm,
    Skip,
}

impl Tier {
    /// Whether this tier warrants picking an outreach channel.
    pub fn warrants_outreach(&self) -> bool {
        !matches!(self, Tier::Skip)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Hot => write!(f, "hot"),
            Tier::Warm => write!(f, "warm"),
            Tier::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(Tier::Hot),
            "warm" => Ok(Tier::Warm),
            "skip" => Ok(Tier::Skip),
            other => Err(CoreError::UnknownTier(other.to_string())),
        }
    }
}
