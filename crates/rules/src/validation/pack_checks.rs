//! Rule checks: conditions, actions, and rule ids within a pack.

use std::collections::HashSet;

use serde_json::Value;

use crate::evaluator::{compile_pattern, MAX_DEPTH};
use crate::schema::*;

use super::fuzzy::nearest;
use super::ValidationResult;

pub(super) fn validate_rules(pack: &RulePack, result: &mut ValidationResult) {
    if pack.spec.rules.is_empty() {
        result.warn("spec.rules", "pack has no rules");
    }

    let mut seen = HashSet::new();
    for (i, rule) in pack.spec.rules.iter().enumerate() {
        let base = format!("spec.rules[{i}]");

        if let Some(id) = &rule.id {
            if id.trim().is_empty() {
                result.error(format!("{base}.id"), "rule id must not be blank");
            } else if !seen.insert(id.as_str()) {
                result.error(format!("{base}.id"), format!("duplicate rule id '{id}'"));
            }
        }

        if let Some(weight) = rule.weight {
            if !weight.is_finite() {
                result.error(format!("{base}.weight"), format!("weight must be finite, got {weight}"));
            } else if weight < 0.0 {
                result.warn(format!("{base}.weight"), "negative weight inverts add/sub");
            }
        }

        if let Some(when) = &rule.when {
            validate_condition(when, &format!("{base}.when"), 0, result);
        }
        validate_action(&rule.then, &format!("{base}.then"), result);
        if let Some(if_not) = &rule.if_not {
            validate_action(if_not, &format!("{base}.if_not"), result);
        }
    }
}

fn validate_condition(cond: &Condition, path: &str, depth: usize, result: &mut ValidationResult) {
    if depth > MAX_DEPTH {
        result.error(path, format!("condition nesting exceeds {MAX_DEPTH} levels"));
        return;
    }
    match cond {
        Condition::Group(group) => {
            if group.children().is_empty() {
                let meaning = match group {
                    Group::Any(_) => "never holds",
                    _ => "always holds",
                };
                result.warn(path, format!("empty '{}' group {meaning}", group.name()));
            }
            for (i, child) in group.children().iter().enumerate() {
                let child_path = format!("{path}.{}[{i}]", group.name());
                validate_condition(child, &child_path, depth + 1, result);
            }
        }
        Condition::Leaf(leaf) => validate_leaf(leaf, path, result),
        Condition::Always(_) => {}
    }
}

fn validate_leaf(leaf: &Leaf, path: &str, result: &mut ValidationResult) {
    if let Operator::Unknown(name) = &leaf.op {
        let msg = format!("unknown operator '{name}'");
        match nearest(name, OPERATOR_NAMES) {
            Some(s) => result.error_with_suggestion(format!("{path}.op"), msg, format!("Did you mean '{s}'?")),
            None => result.error(format!("{path}.op"), msg),
        }
    }

    if leaf.path.is_empty() || leaf.path.split('.').any(str::is_empty) {
        result.error(format!("{path}.path"), format!("invalid path '{}'", leaf.path));
    }

    let value_path = format!("{path}.value");
    match &leaf.op {
        Operator::In | Operator::Nin if !leaf.value.is_array() => {
            result.error(value_path, format!("'{}' needs a list value", leaf.op));
        }
        Operator::Regex => match leaf.value.as_str() {
            Some(pattern) => {
                if let Err(e) = compile_pattern(pattern) {
                    result.error(value_path, format!("invalid regex: {e}"));
                }
            }
            None => result.error(value_path, "regex needs a string pattern"),
        },
        op if op.is_numeric() && matches!(leaf.value, Value::Array(_) | Value::Object(_)) => {
            result.error(value_path, format!("'{op}' needs a scalar value"));
        }
        Operator::Exists if !matches!(leaf.value, Value::Null | Value::Bool(_)) => {
            result.warn(value_path, "exists only distinguishes 'false' from anything else");
        }
        _ => {}
    }
}

fn validate_action(action: &Action, path: &str, result: &mut ValidationResult) {
    for (field, value) in [("add", action.add), ("sub", action.sub), ("mul", action.mul)] {
        if let Some(v) = value {
            if !v.is_finite() {
                result.error(format!("{path}.{field}"), format!("must be a finite number, got {v}"));
            }
        }
    }

    if action.set_tier.is_some() && !action.block {
        result.warn(
            format!("{path}.set_tier"),
            "set_tier is advisory; the threshold pass decides unless respect_manual_tier is on (use block to force skip)",
        );
    }

    if action.is_noop() {
        result.warn(path, "action has no effect");
    }
}
