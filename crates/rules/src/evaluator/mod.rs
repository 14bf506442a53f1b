//! Condition tree evaluator.
//!
//! Evaluation is pure and total: malformed input (unknown operators, bad
//! regexes, type mismatches, missing paths) evaluates to `false` at the leaf
//! instead of failing the rule run.

mod operators;
mod path;
mod pattern;

pub use path::lookup;
pub use pattern::{compile_pattern, REGEX_SIZE_LIMIT};

use serde_json::Value;

use crate::schema::{Condition, Group, Leaf};

/// Nesting beyond this depth evaluates to false.
pub const MAX_DEPTH: usize = 64;

/// Test an optional condition against a fact object. An absent condition holds.
pub fn test(condition: Option<&Condition>, facts: &Value) -> bool {
    match condition {
        Some(c) => eval(c, facts),
        None => true,
    }
}

/// Evaluate a condition tree against a fact object.
pub fn eval(condition: &Condition, facts: &Value) -> bool {
    eval_at(condition, facts, 0)
}

fn eval_at(condition: &Condition, facts: &Value, depth: usize) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }
    match condition {
        Condition::Always(_) => true,
        Condition::Leaf(leaf) => eval_leaf(leaf, facts),
        Condition::Group(group) => {
            let mut children = group.children().iter();
            match group {
                Group::All(_) => children.all(|c| eval_at(c, facts, depth + 1)),
                Group::Any(_) => children.any(|c| eval_at(c, facts, depth + 1)),
                Group::NoneOf(_) => !children.any(|c| eval_at(c, facts, depth + 1)),
            }
        }
    }
}

fn eval_leaf(leaf: &Leaf, facts: &Value) -> bool {
    operators::apply(&leaf.op, lookup(facts, &leaf.path), &leaf.value)
}
