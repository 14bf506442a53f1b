//! Rule packs: named, toggleable, ordered lists of condition → action rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Action, CommonMetadata, Condition};

/// Top-level RulePack document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RulePack {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    pub spec: RulePackSpec,
}

/// The `spec` block of a RulePack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RulePackSpec {
    /// Ordering class: risk packs run first, classification last.
    #[serde(default)]
    pub stage: PackStage,
    /// Order among packs of the same stage (ascending).
    #[serde(default)]
    pub priority: i32,
    pub rules: Vec<Rule>,
}

/// Pack ordering class. Declaration order is the execution order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackStage {
    Risk,
    Compliance,
    #[default]
    Classification,
}

impl fmt::Display for PackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackStage::Risk => write!(f, "risk"),
            PackStage::Compliance => write!(f, "compliance"),
            PackStage::Classification => write!(f, "classification"),
        }
    }
}

/// One declarative rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Absent means "always".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,
    pub then: Action,
    /// Applied instead of `then` when `when` does not hold.
    #[serde(default, alias = "ifNot", skip_serializing_if = "Option::is_none")]
    pub if_not: Option<Action>,
    /// Scales `add`/`sub` of both branches; defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl Rule {
    pub fn new(when: Option<Condition>, then: Action) -> Self {
        Self {
            id: None,
            when,
            then,
            if_not: None,
            weight: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_if_not(mut self, action: Action) -> Self {
        self.if_not = Some(action);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Effective weight; missing or non-finite weights count as 1.
    pub fn effective_weight(&self) -> f64 {
        self.weight.filter(|w| w.is_finite()).unwrap_or(1.0)
    }
}

impl RulePack {
    pub const API_VERSION: &'static str = "v1";
    pub const KIND: &'static str = "RulePack";

    /// Build a pack in code rather than from YAML.
    pub fn new(id: impl Into<String>, stage: PackStage, rules: Vec<Rule>) -> Self {
        Self {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            metadata: CommonMetadata::new(id),
            spec: RulePackSpec {
                stage,
                priority: 0,
                rules,
            },
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.spec.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.metadata.enabled = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn is_enabled(&self) -> bool {
        self.metadata.enabled
    }

    /// Label for rule `index`: its id, or `pack#index` when it has none.
    pub fn rule_label(&self, index: usize) -> String {
        match self.spec.rules.get(index).and_then(|r| r.id.as_deref()) {
            Some(id) => id.to_string(),
            None => format!("{}#{}", self.metadata.id, index),
        }
    }
}
