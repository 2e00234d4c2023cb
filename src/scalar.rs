//! Shared scalar helpers: list splitting that respects nesting and quoting,
//! and the numeric literal rules (leading zeros, `-0`, I-JSON bounds).

use serde_json::Value;

use crate::parser::Parser;

/// Largest integer magnitude accepted in indexes and literals, per I-JSON.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Split `s` at top-level occurrences of `sep`. Separators nested inside
/// brackets, parens, or quoted strings are ignored. Empty segments are
/// returned as-is; callers decide whether they are legal.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;
    for (idx, c) in s.char_indices() {
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
            _ if c == sep && depth == 0 => {
                parts.push(&s[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// True if `s` contains a top-level (unquoted, unnested) occurrence of `sep`.
pub fn has_top_level(s: &str, sep: char) -> bool {
    split_top_level(s, sep).len() > 1
}

pub fn is_quoted(s: &str) -> bool {
    matches!(s.chars().next(), Some('\'' | '"'))
}

/// Unescape a complete quoted string; anything after the closing quote is an
/// error.
pub fn unquote(s: &str) -> Result<String, String> {
    let mut p = Parser::new(s);
    let out = p.parse_quoted_string()?;
    if !p.eof() {
        return Err(format!("unexpected characters after closing quote in `{s}`"));
    }
    Ok(out)
}

/// True for strings shaped like an optionally signed decimal integer.
pub fn looks_like_int(s: &str) -> bool {
    let t = s.trim();
    let digits = t.strip_prefix('-').unwrap_or(t);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse an integer index. Leading zeros and the literal `-0` are syntax
/// errors, as is any magnitude beyond the I-JSON safe range.
pub fn parse_index(s: &str) -> Result<i64, String> {
    let t = s.trim();
    let digits = t.strip_prefix('-').unwrap_or(t);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid integer `{t}`"));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(format!("leading zero in integer `{t}`"));
    }
    if t.starts_with('-') && digits == "0" {
        return Err("`-0` is not a valid index".into());
    }
    let value: i64 = t.parse().map_err(|_| format!("integer `{t}` out of range"))?;
    if value.unsigned_abs() > MAX_SAFE_INTEGER as u64 {
        return Err(format!("integer `{t}` out of range"));
    }
    Ok(value)
}

/// Parse the up-to-three optional components of a slice selector.
#[allow(clippy::type_complexity)]
pub fn parse_slice(s: &str) -> Result<(Option<i64>, Option<i64>, Option<i64>), String> {
    let parts = split_top_level(s, ':');
    if parts.len() > 3 {
        return Err(format!("too many `:` in slice `{s}`"));
    }
    let component = |p: Option<&&str>| -> Result<Option<i64>, String> {
        match p.map(|x| x.trim()) {
            None | Some("") => Ok(None),
            Some(t) => parse_index(t).map(Some),
        }
    };
    Ok((
        component(parts.first())?,
        component(parts.get(1))?,
        component(parts.get(2))?,
    ))
}

/// Parse a filter numeric literal: integer when there is no decimal point or
/// exponent, float otherwise. Numeric-looking but malformed input is a hard
/// error, never a non-match.
pub fn parse_number_literal(s: &str) -> Result<Value, String> {
    let t = s.trim();
    let body = t.strip_prefix('-').unwrap_or(t);
    let int_part = body.split(['.', 'e', 'E']).next().unwrap_or("");
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("malformed number `{t}`"));
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return Err(format!("leading zero in number `{t}`"));
    }
    if body.contains(['.', 'e', 'E']) {
        let f: f64 = t.parse().map_err(|_| format!("malformed number `{t}`"))?;
        if !f.is_finite() {
            return Err(format!("number `{t}` out of range"));
        }
        Ok(Value::from(f))
    } else {
        let i: i64 = t.parse().map_err(|_| format!("number `{t}` out of range"))?;
        if i.unsigned_abs() > MAX_SAFE_INTEGER as u64 {
            return Err(format!("number `{t}` out of range"));
        }
        Ok(Value::from(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn split_respects_quotes_and_nesting() {
        assert_eq!(split_top_level("'a,b',c", ','), vec!["'a,b'", "c"]);
        assert_eq!(split_top_level("?(f(1,2)),3", ','), vec!["?(f(1,2))", "3"]);
        assert_eq!(split_top_level("1:2:3", ':'), vec!["1", "2", "3"]);
        assert_eq!(split_top_level("'a:b'", ':'), vec!["'a:b'"]);
    }

    #[test]
    fn index_rejects_leading_zero_and_minus_zero() {
        assert!(parse_index("01").is_err());
        assert!(parse_index("-0").is_err());
        assert!(parse_index("9007199254740992").is_err());
        assert_eq!(parse_index("-3").unwrap(), -3);
        assert_eq!(parse_index("0").unwrap(), 0);
    }

    #[test]
    fn number_literal_shapes() {
        assert_eq!(parse_number_literal("3").unwrap(), json!(3));
        assert_eq!(parse_number_literal("-0.5").unwrap(), json!(-0.5));
        assert_eq!(parse_number_literal("1e2").unwrap(), json!(100.0));
        assert!(parse_number_literal("01").is_err());
        assert!(parse_number_literal("1.2.3").is_err());
    }

    #[test]
    fn slice_components_are_independent() {
        assert_eq!(parse_slice("::-1").unwrap(), (None, None, Some(-1)));
        assert_eq!(parse_slice("1:4:2").unwrap(), (Some(1), Some(4), Some(2)));
        assert!(parse_slice("1:x").is_err());
        assert!(parse_slice("1:2:3:4").is_err());
    }
}
