//! Recursive condition tree: boolean groups over dotted-path leaf tests.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Operator;

/// A condition node: either a boolean group or a leaf test.
///
/// A node that mixes group and leaf keys fails to deserialize, so every node
/// has exactly one shape. An empty mapping (`{}`) is [`Condition::Always`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Condition {
    Group(Group),
    Leaf(Leaf),
    Always(Always),
}

/// The empty condition; always holds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Always {}

/// Boolean combinator over child conditions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    /// Conjunction; empty is true.
    All(Vec<Condition>),
    /// Disjunction; empty is false.
    Any(Vec<Condition>),
    /// None of the children may hold; empty is true.
    #[serde(rename = "none")]
    NoneOf(Vec<Condition>),
}

/// A single test of the value found at `path` in the fact object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Leaf {
    pub op: Operator,
    /// Dotted lookup path, e.g. `signals.tech.score`.
    pub path: String,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn always() -> Self {
        Condition::Always(Always {})
    }

    pub fn all(children: Vec<Condition>) -> Self {
        Condition::Group(Group::All(children))
    }

    pub fn any(children: Vec<Condition>) -> Self {
        Condition::Group(Group::Any(children))
    }

    pub fn none(children: Vec<Condition>) -> Self {
        Condition::Group(Group::NoneOf(children))
    }

    pub fn leaf(op: impl Into<Operator>, path: impl Into<String>, value: Value) -> Self {
        Condition::Leaf(Leaf {
            op: op.into(),
            path: path.into(),
            value,
        })
    }
}

impl Group {
    pub fn name(&self) -> &'static str {
        match self {
            Group::All(_) => "all",
            Group::Any(_) => "any",
            Group::NoneOf(_) => "none",
        }
    }

    pub fn children(&self) -> &[Condition] {
        match self {
            Group::All(c) | Group::Any(c) | Group::NoneOf(c) => c,
        }
    }
}
