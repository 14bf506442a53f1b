//! Leaf operator semantics and value coercion.
//!
//! String comparisons ignore case. Numeric comparisons coerce both sides;
//! a side that does not coerce (NaN) makes the comparison false.

use std::borrow::Cow;

use serde_json::Value;

use crate::schema::Operator;

use super::pattern::cached_pattern;

/// Apply `op` to the looked-up `actual` value (`None` = undefined).
pub(crate) fn apply(op: &Operator, actual: Option<&Value>, expected: &Value) -> bool {
    match op {
        Operator::Exists => {
            let present = matches!(actual, Some(v) if !v.is_null());
            if expected == &Value::Bool(false) {
                !present
            } else {
                present
            }
        }
        Operator::Neq => match actual {
            Some(a) => !loose_eq(a, expected),
            None => !expected.is_null(),
        },
        Operator::Unknown(_) => false,
        _ => match actual {
            Some(a) => apply_defined(op, a, expected),
            None => false,
        },
    }
}

fn apply_defined(op: &Operator, actual: &Value, expected: &Value) -> bool {
    match op {
        Operator::Eq => loose_eq(actual, expected),
        Operator::Gt => compare(actual, expected, |a, b| a > b),
        Operator::Gte => compare(actual, expected, |a, b| a >= b),
        Operator::Lt => compare(actual, expected, |a, b| a < b),
        Operator::Lte => compare(actual, expected, |a, b| a <= b),
        Operator::In => expected
            .as_array()
            .map(|list| list.iter().any(|e| loose_eq(actual, e)))
            .unwrap_or(false),
        Operator::Nin => expected
            .as_array()
            .map(|list| !list.iter().any(|e| loose_eq(actual, e)))
            .unwrap_or(false),
        Operator::Contains => contains(actual, expected),
        Operator::Regex => regex_match(actual, expected),
        Operator::StartsWith => text_pair(actual, expected)
            .map(|(a, b)| a.starts_with(&b))
            .unwrap_or(false),
        Operator::EndsWith => text_pair(actual, expected)
            .map(|(a, b)| a.ends_with(&b))
            .unwrap_or(false),
        // Handled before dispatch.
        Operator::Exists | Operator::Neq | Operator::Unknown(_) => false,
    }
}

/// Equality with case-insensitive strings and numeric strings matching numbers.
pub(crate) fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.to_lowercase() == y.to_lowercase(),
        (Value::Number(_), Value::Number(_)) => to_number(a) == to_number(b),
        (Value::Number(_), Value::String(s)) | (Value::String(s), Value::Number(_)) => {
            !s.trim().is_empty() && to_number(a) == to_number(b)
        }
        _ => a == b,
    }
}

/// Numeric coercion: numbers as-is, booleans 1/0, null 0, strings parsed
/// after trimming (empty → 0), everything else NaN.
pub(crate) fn to_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn compare(a: &Value, b: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let (x, y) = (to_number(a), to_number(b));
    if x.is_nan() || y.is_nan() {
        return false;
    }
    cmp(x, y)
}

/// Render scalars as text; arrays, objects and null have no text form.
pub(crate) fn scalar_text(v: &Value) -> Option<Cow<'_, str>> {
    match v {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

fn text_pair(a: &Value, b: &Value) -> Option<(String, String)> {
    Some((scalar_text(a)?.to_lowercase(), scalar_text(b)?.to_lowercase()))
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, expected)),
        Value::Object(_) | Value::Null => false,
        _ => text_pair(actual, expected)
            .map(|(hay, needle)| hay.contains(&needle))
            .unwrap_or(false),
    }
}

fn regex_match(actual: &Value, expected: &Value) -> bool {
    let (Some(text), Some(pattern)) = (scalar_text(actual), expected.as_str()) else {
        return false;
    };
    cached_pattern(pattern)
        .map(|re| re.is_match(&text))
        .unwrap_or(false)
}
