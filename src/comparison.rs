//! Comparison semantics for filter operands: equality is type-sensitive and
//! recursive for containers; ordering exists only between two numbers or two
//! strings. Neither ever errors.

use serde_json::{Number, Value};

use crate::filter::FilterValue;

/// Equality over filter operands, including the absent-value rules:
/// `Nothing == Nothing` holds, and `Nothing == 0` holds in either position.
pub fn eq(a: &FilterValue, b: &FilterValue) -> bool {
    match (a, b) {
        (FilterValue::Nothing, FilterValue::Nothing) => true,
        (FilterValue::Nothing, FilterValue::Json(v))
        | (FilterValue::Json(v), FilterValue::Nothing) => is_zero(v),
        (FilterValue::Json(x), FilterValue::Json(y)) => value_eq(x, y),
    }
}

/// Strict less-than. Any combination other than number/number or
/// string/string is false.
pub fn lt(a: &FilterValue, b: &FilterValue) -> bool {
    match (a, b) {
        (FilterValue::Json(Value::Number(x)), FilterValue::Json(Value::Number(y))) => {
            num_lt(x, y)
        }
        (FilterValue::Json(Value::String(x)), FilterValue::Json(Value::String(y))) => x < y,
        _ => false,
    }
}

fn is_zero(v: &Value) -> bool {
    matches!(v, Value::Number(n) if n.as_f64() == Some(0.0))
}

pub(crate) fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => num_eq(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| value_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| value_eq(v, w)))
        }
        _ => false,
    }
}

fn num_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn num_lt(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x < y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x < y,
        _ => false,
    }
}
