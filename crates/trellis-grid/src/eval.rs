use std::cmp::Ordering;

use serde_json::Value;
use tracing::warn;

use crate::predicate::Predicate;
use crate::source::Row;

/// Evaluate whether a row matches the given predicate.
///
/// Applies the same operator semantics as the SQL side directly to row
/// values, for array-backed sources. Incompatible types are silently
/// excluded rather than erroring, mirroring the pipeline's tolerance of
/// stale client state.
pub fn row_matches(row: &Row, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::And(children) => children.iter().all(|c| row_matches(row, c)),
        Predicate::Or(children) => children.iter().any(|c| row_matches(row, c)),
        Predicate::Eq(field, val) => row.get(field).is_some_and(|v| value_eq(v, val)),
        Predicate::NotEq(field, val) => !row.get(field).is_some_and(|v| value_eq(v, val)),
        Predicate::In(field, items) => row
            .get(field)
            .is_some_and(|v| items.iter().any(|item| value_eq(v, item))),
        Predicate::Like(field, pattern) => match row.get(field) {
            Some(Value::String(text)) => like_match(text, pattern),
            _ => false,
        },
        Predicate::Lt(field, val) => {
            value_cmp(row.get(field), val, |o| o == Ordering::Less)
        }
        Predicate::Gt(field, val) => {
            value_cmp(row.get(field), val, |o| o == Ordering::Greater)
        }
        Predicate::Between(field, lo, hi) => {
            value_cmp(row.get(field), lo, |o| o != Ordering::Less)
                && value_cmp(row.get(field), hi, |o| o != Ordering::Greater)
        }
        Predicate::Raw(fragment) => {
            // Raw SQL cannot be evaluated against in-memory rows; accept
            // the row so the escape hatch degrades to a no-op here.
            warn!(%fragment, "raw predicate ignored by in-memory evaluation");
            true
        }
    }
}

/// SQL-style LIKE with `%` wildcards at either end of the pattern.
/// Mid-pattern wildcards are not interpreted.
fn like_match(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    match (pattern.strip_prefix('%'), pattern.strip_suffix('%')) {
        (Some(inner), _) if inner.ends_with('%') => {
            text.contains(inner.trim_end_matches('%'))
        }
        (Some(suffix), _) => text.ends_with(suffix),
        (_, Some(prefix)) => text.starts_with(prefix),
        _ => text == pattern,
    }
}

fn value_eq(store_val: &Value, query_val: &Value) -> bool {
    match (store_val, query_val) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (Value::Bool(a), Value::Bool(b)) => a == b,
        // Booleans normalize to 1/0 at compile time; rows may still hold
        // the raw boolean.
        (Value::Bool(a), Value::Number(n)) | (Value::Number(n), Value::Bool(a)) => {
            n.as_i64() == Some(i64::from(*a))
        }
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            match (s.parse::<f64>(), n.as_f64()) {
                (Ok(a), Some(b)) => a == b,
                _ => false,
            }
        }
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn value_cmp(field_value: Option<&Value>, query_val: &Value, predicate: fn(Ordering) -> bool) -> bool {
    let Some(store_val) = field_value else {
        return false;
    };
    match (store_val, query_val) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).is_some_and(predicate),
            _ => false,
        },
        // Date/datetime bounds travel as `%Y-%m-%d %H:%M:%S` strings,
        // which compare correctly as text.
        (Value::String(a), Value::String(b)) => predicate(a.as_str().cmp(b.as_str())),
        (Value::String(s), Value::Number(n)) => match (s.parse::<f64>(), n.as_f64()) {
            (Ok(a), Some(b)) => a.partial_cmp(&b).is_some_and(predicate),
            _ => false,
        },
        (Value::Number(n), Value::String(s)) => match (n.as_f64(), s.parse::<f64>()) {
            (Some(a), Ok(b)) => a.partial_cmp(&b).is_some_and(predicate),
            _ => false,
        },
        _ => false,
    }
}

/// Total order over row values for in-memory sorting. Missing fields sort
/// first; incomparable types compare equal.
pub(crate) fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        },
    }
}
