//! Token-by-token evaluation of a path against a decoded tree. A current
//! node list starts as `[root]`; every token maps each member independently
//! and concatenates the results in member order, duplicates preserved.
//!
//! Two failure modes are kept strictly apart: selector content that is
//! syntactically invalid (leading zeros, mismatched quotes, stray commas) is
//! a hard error naming the fragment, while a selector that merely fits
//! nothing (wrong node type, out-of-range index, missing key) contributes an
//! empty sub-list and the walk continues.

use serde_json::Value;
use tracing::trace;

use crate::errors::{JsonPathError, Result};
use crate::filter::FilterExpr;
use crate::functions::Registry;
use crate::scalar;
use crate::tokenizer::Token;

/// Evaluate a token sequence against a document root.
pub fn eval_tokens<'a>(
    tokens: &[Token],
    root: &'a Value,
    registry: &Registry,
) -> Result<Vec<&'a Value>> {
    eval_from(tokens, root, root, registry)
}

/// Evaluate from an arbitrary seed node, keeping `root` available for
/// absolute sub-queries inside filters. Filter sub-queries re-enter here
/// directly with their own token slices.
pub(crate) fn eval_from<'a>(
    tokens: &[Token],
    seed: &'a Value,
    root: &'a Value,
    registry: &Registry,
) -> Result<Vec<&'a Value>> {
    let mut current = vec![seed];
    let mut i = 0;
    while i < tokens.len() {
        // `..['key']` is one compound step: the key selector applies only to
        // the container-typed results of the descent.
        if tokens[i] == Token::Recursive {
            if let Some(Token::Bracket(content)) = tokens.get(i + 1) {
                if is_quoted_key_selector(content) {
                    let mut next = Vec::new();
                    for v in current {
                        let mut nodes = Vec::new();
                        collect_descendants(v, &mut nodes);
                        for d in nodes {
                            if d.is_object() || d.is_array() {
                                next.extend(apply_bracket(content, d, root, registry)?);
                            }
                        }
                    }
                    current = next;
                    i += 2;
                    continue;
                }
            }
        }
        trace!(token = ?tokens[i], nodes = current.len(), "apply");
        current = apply_token(&tokens[i], current, root, registry)?;
        i += 1;
    }
    Ok(current)
}

fn apply_token<'a>(
    token: &Token,
    current: Vec<&'a Value>,
    root: &'a Value,
    registry: &Registry,
) -> Result<Vec<&'a Value>> {
    match token {
        Token::Name(n) if n == "*" => {
            Ok(current.into_iter().flat_map(wildcard_values).collect())
        }
        Token::Name(key) => Ok(current
            .into_iter()
            .flat_map(|v| match v {
                Value::Object(map) => map.get(key.as_str()).into_iter().collect(),
                _ => Vec::new(),
            })
            .collect()),
        Token::Recursive => {
            let mut out = Vec::new();
            for v in current {
                collect_descendants(v, &mut out);
            }
            Ok(out)
        }
        Token::Bracket(content) => {
            let mut out = Vec::new();
            for v in current {
                out.extend(apply_bracket(content, v, root, registry)?);
            }
            Ok(out)
        }
    }
}

fn wildcard_values(v: &Value) -> Vec<&Value> {
    match v {
        Value::Array(arr) => arr.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

/// Self plus every descendant, pre-order depth-first. Only containers are
/// descended into; scalars appear as visited children.
fn collect_descendants<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
    out.push(v);
    match v {
        Value::Array(arr) => {
            for elt in arr {
                collect_descendants(elt, out);
            }
        }
        Value::Object(map) => {
            for elt in map.values() {
                collect_descendants(elt, out);
            }
        }
        _ => {}
    }
}

/// Dispatch one bracket selector against one node. Shape is decided here:
/// wildcard, integer index, slice, filter, quoted keys, or a comma union of
/// those.
fn apply_bracket<'a>(
    content: &str,
    node: &'a Value,
    root: &'a Value,
    registry: &Registry,
) -> Result<Vec<&'a Value>> {
    let c = content.trim();
    if c.is_empty() {
        return Err(JsonPathError::Query("empty bracket selector `[]`".into()));
    }
    if c == "*" {
        return Ok(wildcard_values(node));
    }

    let parts = scalar::split_top_level(c, ',');
    if parts.len() > 1 {
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(JsonPathError::Query(format!(
                "empty term in selector list `{c}`"
            )));
        }
        if parts.iter().all(|p| scalar::looks_like_int(p)) {
            let mut out = Vec::new();
            for p in &parts {
                let idx = scalar::parse_index(p)
                    .map_err(|e| JsonPathError::Query(format!("in selector `{c}`: {e}")))?;
                out.extend(index_lookup(node, idx));
            }
            return Ok(out);
        }
        if parts.iter().all(|p| scalar::is_quoted(p.trim())) {
            let mut keys = Vec::with_capacity(parts.len());
            for p in &parts {
                keys.push(scalar::unquote(p.trim()).map_err(JsonPathError::Query)?);
            }
            return Ok(select_keys(node, &keys));
        }
        // Mixed list (any filter term included): every sub-term runs as its
        // own selector and the results concatenate in term order.
        let mut out = Vec::new();
        for p in &parts {
            out.extend(apply_bracket(p, node, root, registry)?);
        }
        return Ok(out);
    }

    if let Some(body) = c.strip_prefix('?') {
        return apply_filter(body, node, root, registry);
    }
    if scalar::is_quoted(c) {
        let key = scalar::unquote(c).map_err(JsonPathError::Query)?;
        return Ok(match node {
            Value::Object(map) => map.get(key.as_str()).into_iter().collect(),
            _ => Vec::new(),
        });
    }
    if scalar::has_top_level(c, ':') {
        let (start, end, step) = scalar::parse_slice(c)
            .map_err(|e| JsonPathError::Query(format!("in selector `{c}`: {e}")))?;
        return Ok(match node {
            Value::Array(arr) => slice_array(arr, start, end, step),
            _ => Vec::new(),
        });
    }
    if scalar::looks_like_int(c) {
        let idx = scalar::parse_index(c)
            .map_err(|e| JsonPathError::Query(format!("in selector `{c}`: {e}")))?;
        return Ok(index_lookup(node, idx));
    }
    Err(JsonPathError::Query(format!("unrecognized selector `{c}`")))
}

/// Array index with negative-from-end handling; out-of-range is a non-match,
/// not an error.
fn index_lookup(node: &Value, idx: i64) -> Vec<&Value> {
    let Value::Array(arr) = node else {
        return Vec::new();
    };
    let len = arr.len() as i64;
    let i = if idx < 0 { len + idx } else { idx };
    if i < 0 || i >= len {
        Vec::new()
    } else {
        vec![&arr[i as usize]]
    }
}

/// RFC slice bounds: defaults depend on the sign of the step, indexes clamp
/// instead of erroring, a zero step selects nothing.
fn slice_array(
    arr: &[Value],
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> Vec<&Value> {
    let step = step.unwrap_or(1);
    if step == 0 || arr.is_empty() {
        return Vec::new();
    }
    let len = arr.len() as i64;
    let normalize = |i: i64| if i >= 0 { i } else { len + i };
    let mut out = Vec::new();
    if step > 0 {
        let lower = normalize(start.unwrap_or(0)).clamp(0, len);
        let upper = normalize(end.unwrap_or(len)).clamp(0, len);
        let mut i = lower;
        while i < upper {
            out.push(&arr[i as usize]);
            i += step;
        }
    } else {
        let upper = normalize(start.unwrap_or(len - 1)).clamp(-1, len - 1);
        let lower = normalize(end.unwrap_or(-len - 1)).clamp(-1, len - 1);
        let mut i = upper;
        while i > lower {
            out.push(&arr[i as usize]);
            i += step;
        }
    }
    out
}

/// Quoted-key list. On an object: the listed keys that are present, in list
/// order. On an array: for every item in order, each listed key present in
/// that item — the broadcast-over-records shape.
fn select_keys<'a>(node: &'a Value, keys: &[String]) -> Vec<&'a Value> {
    match node {
        Value::Object(map) => keys.iter().filter_map(|k| map.get(k.as_str())).collect(),
        Value::Array(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::Object(map) => keys
                    .iter()
                    .filter_map(|k| map.get(k.as_str()))
                    .collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn apply_filter<'a>(
    body: &str,
    node: &'a Value,
    root: &'a Value,
    registry: &Registry,
) -> Result<Vec<&'a Value>> {
    let expr = FilterExpr::parse(body)?;
    let mut out = Vec::new();
    match node {
        Value::Array(items) => {
            for v in items {
                if expr.matches(v, root, registry)? {
                    out.push(v);
                }
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                if expr.matches(v, root, registry)? {
                    out.push(v);
                }
            }
        }
        _ => {}
    }
    Ok(out)
}

fn is_quoted_key_selector(content: &str) -> bool {
    let parts = scalar::split_top_level(content.trim(), ',');
    !parts.is_empty() && parts.iter().all(|p| scalar::is_quoted(p.trim()))
}
