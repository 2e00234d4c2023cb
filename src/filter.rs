//! The `?`-selector sub-language: boolean logic, comparisons, sub-queries
//! against the candidate (`@`) or the document root (`$`), and extension
//! function calls.
//!
//! Parsing splits at the rightmost top-level logical operator (tracking
//! bracket, paren, and quote depth), which gives left-associative
//! short-circuit chains without a token stream. Comparison operands that are
//! non-singular queries are rejected here, before any candidate is examined.

use serde_json::Value;

use crate::comparison;
use crate::errors::{JsonPathError, Result};
use crate::evaluator;
use crate::functions::{FnArg, Registry};
use crate::parser::Parser;
use crate::scalar;
use crate::tokenizer::{self, Token};

/// An evaluated operand: either a present JSON value or the distinguished
/// absent-value sentinel. The sentinel never leaves the crate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Nothing,
    Json(Value),
}

impl FilterValue {
    /// Truthiness of a function result used directly as a filter: numbers
    /// are true iff positive, booleans are themselves, absent and null are
    /// false, strings and containers are true iff non-empty.
    pub fn truthy(&self) -> bool {
        match self {
            FilterValue::Nothing => false,
            FilterValue::Json(Value::Null) => false,
            FilterValue::Json(Value::Bool(b)) => *b,
            FilterValue::Json(Value::Number(n)) => n.as_f64().is_some_and(|f| f > 0.0),
            FilterValue::Json(Value::String(s)) => !s.is_empty(),
            FilterValue::Json(Value::Array(a)) => !a.is_empty(),
            FilterValue::Json(Value::Object(m)) => !m.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `@` — the candidate node under test.
    Current,
    /// `$` — the document root.
    Root,
}

/// A path embedded in a filter expression.
#[derive(Debug, Clone)]
pub struct SubQuery {
    pub anchor: Anchor,
    pub tokens: Vec<Token>,
}

impl SubQuery {
    /// A query is singular when no step can produce more than one node.
    fn is_singular(&self) -> bool {
        self.tokens.iter().all(|t| match t {
            Token::Recursive => false,
            Token::Name(n) => n != "*",
            Token::Bracket(c) => bracket_is_singular(c),
        })
    }

    fn resolve<'a>(
        &self,
        current: &'a Value,
        root: &'a Value,
        registry: &Registry,
    ) -> Result<Vec<&'a Value>> {
        let seed = match self.anchor {
            Anchor::Current => current,
            Anchor::Root => root,
        };
        evaluator::eval_from(&self.tokens, seed, root, registry)
    }
}

fn bracket_is_singular(content: &str) -> bool {
    let c = content.trim();
    if scalar::split_top_level(c, ',').len() != 1 {
        return false;
    }
    if scalar::is_quoted(c) {
        return true;
    }
    if c == "*" || c.starts_with('?') || scalar::has_top_level(c, ':') {
        return false;
    }
    scalar::looks_like_int(c)
}

#[derive(Debug, Clone)]
pub enum Operand {
    Literal(Value),
    Query(SubQuery),
    Call(Box<FnCall>),
}

#[derive(Debug, Clone)]
pub struct FnCall {
    pub name: String,
    pub args: Vec<Operand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
pub enum FilterExpr {
    Or(Box<FilterExpr>, Box<FilterExpr>),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
    Compare(Operand, CmpOp, Operand),
    Exists(SubQuery),
    Call(FnCall),
}

impl FilterExpr {
    /// Parse a filter body (leading `?` already stripped).
    pub fn parse(input: &str) -> Result<Self> {
        parse_expr(input)
    }

    /// Decide whether one candidate node passes the filter.
    pub fn matches(&self, current: &Value, root: &Value, registry: &Registry) -> Result<bool> {
        match self {
            FilterExpr::Or(l, r) => {
                if l.matches(current, root, registry)? {
                    Ok(true)
                } else {
                    r.matches(current, root, registry)
                }
            }
            FilterExpr::And(l, r) => {
                if l.matches(current, root, registry)? {
                    r.matches(current, root, registry)
                } else {
                    Ok(false)
                }
            }
            FilterExpr::Not(inner) => Ok(!inner.matches(current, root, registry)?),
            FilterExpr::Compare(lhs, op, rhs) => {
                let a = eval_operand(lhs, current, root, registry)?;
                let b = eval_operand(rhs, current, root, registry)?;
                Ok(match op {
                    CmpOp::Eq => comparison::eq(&a, &b),
                    CmpOp::Ne => !comparison::eq(&a, &b),
                    CmpOp::Lt => comparison::lt(&a, &b),
                    CmpOp::Le => comparison::lt(&a, &b) || comparison::eq(&a, &b),
                    CmpOp::Gt => comparison::lt(&b, &a),
                    CmpOp::Ge => comparison::lt(&b, &a) || comparison::eq(&a, &b),
                })
            }
            FilterExpr::Exists(q) => Ok(!q.resolve(current, root, registry)?.is_empty()),
            FilterExpr::Call(call) => Ok(eval_call(call, current, root, registry)?.truthy()),
        }
    }
}

fn query_err(msg: impl Into<String>) -> JsonPathError {
    JsonPathError::Query(msg.into())
}

fn parse_expr(input: &str) -> Result<FilterExpr> {
    let s = input.trim();
    if s.is_empty() {
        return Err(query_err("empty filter expression"));
    }
    if let Some(i) = rfind_top_level(s, "||") {
        return Ok(FilterExpr::Or(
            Box::new(parse_expr(&s[..i])?),
            Box::new(parse_expr(&s[i + 2..])?),
        ));
    }
    if let Some(i) = rfind_top_level(s, "&&") {
        return Ok(FilterExpr::And(
            Box::new(parse_expr(&s[..i])?),
            Box::new(parse_expr(&s[i + 2..])?),
        ));
    }
    if let Some(rest) = s.strip_prefix('!') {
        if !rest.trim_start().starts_with('=') {
            return Ok(FilterExpr::Not(Box::new(parse_expr(rest)?)));
        }
    }
    if let Some((lhs, op, rhs)) = split_comparison(s) {
        return Ok(FilterExpr::Compare(
            parse_operand(lhs, true)?,
            op,
            parse_operand(rhs, true)?,
        ));
    }
    if s.starts_with('(') && paren_wrapped(s) {
        return parse_expr(&s[1..s.len() - 1]);
    }
    if s.starts_with('@') || s.starts_with('$') {
        return Ok(FilterExpr::Exists(parse_subquery(s)?));
    }
    if let Some(call) = try_parse_call(s)? {
        return Ok(FilterExpr::Call(call));
    }
    Err(query_err(format!("unrecognized filter expression `{s}`")))
}

/// Index of the rightmost top-level occurrence of `op`, ignoring anything
/// nested in brackets, parens, or quoted strings.
fn rfind_top_level(s: &str, op: &str) -> Option<usize> {
    let mut found = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && s[i..].starts_with(op) => found = Some(i),
            _ => {}
        }
    }
    found
}

/// Find the single top-level comparison operator, longest match first so
/// `<=` and `>=` are never mis-split.
fn split_comparison(s: &str) -> Option<(&str, CmpOp, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                let rest = &s[i..];
                let (op, len) = if rest.starts_with("==") {
                    (CmpOp::Eq, 2)
                } else if rest.starts_with("!=") {
                    (CmpOp::Ne, 2)
                } else if rest.starts_with("<=") {
                    (CmpOp::Le, 2)
                } else if rest.starts_with(">=") {
                    (CmpOp::Ge, 2)
                } else if c == '<' {
                    (CmpOp::Lt, 1)
                } else if c == '>' {
                    (CmpOp::Gt, 1)
                } else {
                    continue;
                };
                return Some((&s[..i], op, &s[i + len..]));
            }
            _ => {}
        }
    }
    None
}

/// True if the `(` opening `s` is matched by a `)` that is the final char.
fn paren_wrapped(s: &str) -> bool {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return c == ')' && i == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

fn parse_subquery(s: &str) -> Result<SubQuery> {
    let (anchor, rest) = if let Some(r) = s.strip_prefix('@') {
        (Anchor::Current, r)
    } else if let Some(r) = s.strip_prefix('$') {
        (Anchor::Root, r)
    } else {
        return Err(query_err(format!("expected `@` or `$` in `{s}`")));
    };
    let tokens =
        tokenizer::tokenize_relative(rest).map_err(|e| query_err(format!("in `{s}`: {e}")))?;
    Ok(SubQuery { anchor, tokens })
}

/// Parse a comparison operand or function argument. `singular_only` is set
/// for comparison operands, where a query that could yield more than one
/// node is a hard error before any evaluation happens.
fn parse_operand(s: &str, singular_only: bool) -> Result<Operand> {
    let t = s.trim();
    if t.is_empty() {
        return Err(query_err("missing operand"));
    }
    if scalar::is_quoted(t) {
        let lit = scalar::unquote(t).map_err(JsonPathError::Query)?;
        return Ok(Operand::Literal(Value::String(lit)));
    }
    match t {
        "true" => return Ok(Operand::Literal(Value::Bool(true))),
        "false" => return Ok(Operand::Literal(Value::Bool(false))),
        "null" => return Ok(Operand::Literal(Value::Null)),
        _ => {}
    }
    if t.starts_with('@') || t.starts_with('$') {
        let q = parse_subquery(t)?;
        if singular_only && !q.is_singular() {
            return Err(query_err(format!(
                "non-singular query `{t}` used as comparison operand"
            )));
        }
        return Ok(Operand::Query(q));
    }
    if t.starts_with('-') || t.starts_with(|c: char| c.is_ascii_digit()) {
        let n = scalar::parse_number_literal(t).map_err(JsonPathError::Query)?;
        return Ok(Operand::Literal(n));
    }
    if let Some(call) = try_parse_call(t)? {
        return Ok(Operand::Call(Box::new(call)));
    }
    Err(query_err(format!("invalid operand `{t}`")))
}

fn try_parse_call(s: &str) -> Result<Option<FnCall>> {
    let mut p = Parser::new(s);
    let Ok(name) = p.parse_identifier() else {
        return Ok(None);
    };
    p.skip_ws();
    if !p.consume_char('(') {
        return Ok(None);
    }
    let inner = p
        .capture_balanced('(', ')')
        .map_err(|e| query_err(format!("in `{s}`: {e}")))?;
    p.skip_ws();
    if !p.eof() {
        return Err(query_err(format!("unexpected trailing input in `{s}`")));
    }
    let mut args = Vec::new();
    if !inner.trim().is_empty() {
        for part in scalar::split_top_level(inner, ',') {
            args.push(parse_operand(part, false)?);
        }
    }
    Ok(Some(FnCall { name, args }))
}

fn eval_operand(
    op: &Operand,
    current: &Value,
    root: &Value,
    registry: &Registry,
) -> Result<FilterValue> {
    match op {
        Operand::Literal(v) => Ok(FilterValue::Json(v.clone())),
        Operand::Query(q) => {
            let nodes = q.resolve(current, root, registry)?;
            Ok(match nodes.as_slice() {
                [node] => FilterValue::Json((*node).clone()),
                _ => FilterValue::Nothing,
            })
        }
        Operand::Call(call) => eval_call(call, current, root, registry),
    }
}

/// Evaluate a function call: arguments left to right, each carrying the size
/// of the nodelist it came from, then dispatch through the registry.
pub(crate) fn eval_call(
    call: &FnCall,
    current: &Value,
    root: &Value,
    registry: &Registry,
) -> Result<FilterValue> {
    let func = registry
        .get(&call.name)
        .ok_or_else(|| query_err(format!("unknown function `{}`", call.name)))?;
    if !func.arity().contains(&call.args.len()) {
        return Err(query_err(format!(
            "{}() takes {:?} arguments, got {}",
            call.name,
            func.arity(),
            call.args.len()
        )));
    }
    let mut args = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        args.push(match arg {
            Operand::Literal(v) => FnArg {
                value: FilterValue::Json(v.clone()),
                nodelist_len: 1,
            },
            Operand::Query(q) => {
                let nodes = q.resolve(current, root, registry)?;
                FnArg {
                    value: match nodes.as_slice() {
                        [node] => FilterValue::Json((*node).clone()),
                        _ => FilterValue::Nothing,
                    },
                    nodelist_len: nodes.len(),
                }
            }
            Operand::Call(inner) => FnArg {
                value: eval_call(inner, current, root, registry)?,
                nodelist_len: 1,
            },
        });
    }
    func.call(&args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rightmost_split_is_left_associative() {
        // a || b || c must split at the second ||
        let expr = FilterExpr::parse("@.a || @.b || @.c").unwrap();
        match expr {
            FilterExpr::Or(left, _) => assert!(matches!(*left, FilterExpr::Or(..))),
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn operators_inside_strings_are_ignored() {
        let expr = FilterExpr::parse("@.op == '&&'").unwrap();
        assert!(matches!(expr, FilterExpr::Compare(_, CmpOp::Eq, _)));
    }

    #[test]
    fn non_singular_comparison_operand_is_rejected() {
        assert!(FilterExpr::parse("@.* == 1").is_err());
        assert!(FilterExpr::parse("@[1:3] == 1").is_err());
        assert!(FilterExpr::parse("@..a == 1").is_err());
        assert!(FilterExpr::parse("@['a','b'] == 1").is_err());
        // but fine as an existence test or function argument
        assert!(FilterExpr::parse("@.*").is_ok());
        assert!(FilterExpr::parse("count(@.*) == 2").is_ok());
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        let expr = FilterExpr::parse("!@.a == 1").unwrap();
        assert!(matches!(expr, FilterExpr::Not(_)));
    }

    #[test]
    fn malformed_numbers_are_hard_errors() {
        assert!(FilterExpr::parse("@.a == 01").is_err());
        assert!(FilterExpr::parse("@.a == 1.2.3").is_err());
    }
}
