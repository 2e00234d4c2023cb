//! Extension functions available inside filter expressions, behind a
//! pluggable registry. The builtins are the five standard functions:
//! `length`, `count`, `match`, `search`, and `value`.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::errors::{JsonPathError, Result};
use crate::filter::FilterValue;

/// One evaluated argument: the value plus the size of the nodelist it was
/// drawn from (1 for a literal or a bare `@`, the result count for a path).
pub struct FnArg {
    pub value: FilterValue,
    pub nodelist_len: usize,
}

/// Trait for pluggable functions used by the filter evaluator.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    fn arity(&self) -> RangeInclusive<usize>;
    fn call(&self, args: &[FnArg]) -> Result<FilterValue>;
}

/// Thread-safe function registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut map: HashMap<&'static str, Arc<dyn Function>> = HashMap::new();
        map.insert("length", Arc::new(builtins::Length));
        map.insert("count", Arc::new(builtins::Count));
        map.insert("match", Arc::new(builtins::Match));
        map.insert("search", Arc::new(builtins::Search));
        map.insert("value", Arc::new(builtins::ValueOf));
        Self {
            inner: Arc::new(map),
        }
    }

    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(f.name(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }
}

fn require_singular(name: &str, arg: &FnArg) -> Result<()> {
    if arg.nodelist_len > 1 {
        return Err(JsonPathError::Query(format!(
            "{name}(): non-singular argument (nodelist of {})",
            arg.nodelist_len
        )));
    }
    Ok(())
}

/// Translate an I-Regexp pattern into host regex syntax: a bare `.` outside
/// character classes means "any character except CR/LF". Returns `None` when
/// the translated pattern does not compile.
fn compile_iregexp(pattern: &str, anchored: bool) -> Option<Regex> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push('[');
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            '.' if !in_class => out.push_str("[^\\r\\n]"),
            _ => out.push(c),
        }
    }
    let full = if anchored {
        format!("^(?:{out})$")
    } else {
        out
    };
    Regex::new(&full).ok()
}

fn as_str(arg: &FnArg) -> Option<&str> {
    match &arg.value {
        FilterValue::Json(Value::String(s)) => Some(s),
        _ => None,
    }
}

pub mod builtins {
    use super::*;

    pub struct Length;
    impl Function for Length {
        fn name(&self) -> &'static str {
            "length"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=1
        }
        fn call(&self, args: &[FnArg]) -> Result<FilterValue> {
            require_singular("length", &args[0])?;
            Ok(match &args[0].value {
                FilterValue::Json(Value::String(s)) => {
                    FilterValue::Json(Value::from(s.chars().count() as i64))
                }
                FilterValue::Json(Value::Array(a)) => {
                    FilterValue::Json(Value::from(a.len() as i64))
                }
                FilterValue::Json(Value::Object(m)) => {
                    FilterValue::Json(Value::from(m.len() as i64))
                }
                _ => FilterValue::Nothing,
            })
        }
    }

    pub struct Count;
    impl Function for Count {
        fn name(&self) -> &'static str {
            "count"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=1
        }
        fn call(&self, args: &[FnArg]) -> Result<FilterValue> {
            // count() measures nodelist size itself, so it is exempt from
            // the singular-argument rule.
            Ok(FilterValue::Json(Value::from(args[0].nodelist_len as i64)))
        }
    }

    pub struct Match;
    impl Function for Match {
        fn name(&self) -> &'static str {
            "match"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[FnArg]) -> Result<FilterValue> {
            require_singular("match", &args[0])?;
            require_singular("match", &args[1])?;
            let matched = match (as_str(&args[0]), as_str(&args[1])) {
                (Some(s), Some(pattern)) => compile_iregexp(pattern, true)
                    .map(|re| re.is_match(s))
                    .unwrap_or(false),
                _ => false,
            };
            Ok(FilterValue::Json(Value::Bool(matched)))
        }
    }

    pub struct Search;
    impl Function for Search {
        fn name(&self) -> &'static str {
            "search"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[FnArg]) -> Result<FilterValue> {
            require_singular("search", &args[0])?;
            require_singular("search", &args[1])?;
            let matched = match (as_str(&args[0]), as_str(&args[1])) {
                (Some(s), Some(pattern)) => compile_iregexp(pattern, false)
                    .map(|re| re.is_match(s))
                    .unwrap_or(false),
                _ => false,
            };
            Ok(FilterValue::Json(Value::Bool(matched)))
        }
    }

    pub struct ValueOf;
    impl Function for ValueOf {
        fn name(&self) -> &'static str {
            "value"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=1
        }
        fn call(&self, args: &[FnArg]) -> Result<FilterValue> {
            Ok(match args[0].nodelist_len {
                0 | 1 => args[0].value.clone(),
                _ => FilterValue::Nothing,
            })
        }
    }
}
