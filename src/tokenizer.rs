use crate::errors::{JsonPathError, Result};
use crate::parser::Parser;

/// One step of a path. Bracket interiors are carried raw; the evaluator
/// classifies them once it has a node in hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Dot-accessed member name, or `*`.
    Name(String),
    /// Unparsed interior of a `[...]` selector.
    Bracket(String),
    /// The `..` descent marker.
    Recursive,
}

/// Split a full path (leading `$` required) into tokens.
pub fn tokenize(path: &str) -> Result<Vec<Token>> {
    let mut p = Parser::new(path);
    p.skip_ws();
    if !p.consume_char('$') {
        return Err(JsonPathError::InvalidPath(format!(
            "path must start with `$`, got `{path}`"
        )));
    }
    segments(&mut p).map_err(|e| JsonPathError::InvalidPath(format!("in `{path}`: {e}")))
}

/// Tokenize the segments following an anchor (`$` or `@`). The filter parser
/// uses this directly for sub-queries, so there is no re-assembled path
/// string anywhere.
pub(crate) fn tokenize_relative(s: &str) -> std::result::Result<Vec<Token>, String> {
    segments(&mut Parser::new(s))
}

fn segments(p: &mut Parser<'_>) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    loop {
        p.skip_ws();
        if p.eof() {
            break;
        }
        if p.consume_str("..") {
            tokens.push(Token::Recursive);
            if p.consume_char('*') {
                tokens.push(Token::Name("*".into()));
                continue;
            }
            if p.peek_char() == Some('[') {
                continue;
            }
            let name = p
                .parse_identifier()
                .map_err(|_| "`..` must be followed by a name, `*`, or `[`".to_string())?;
            tokens.push(Token::Name(name));
            continue;
        }
        if p.consume_char('.') {
            if p.consume_char('*') {
                tokens.push(Token::Name("*".into()));
                continue;
            }
            tokens.push(Token::Name(p.parse_identifier()?));
            continue;
        }
        if p.consume_char('[') {
            tokens.push(Token::Bracket(p.capture_balanced('[', ']')?.to_string()));
            continue;
        }
        let c = p.peek_char().unwrap_or_default();
        return Err(format!("unexpected character `{c}` at offset {}", p.offset()));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dots_brackets_and_descent() {
        let tokens = tokenize("$.a[0]..b[*]").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Name("a".into()),
                Token::Bracket("0".into()),
                Token::Recursive,
                Token::Name("b".into()),
                Token::Bracket("*".into()),
            ]
        );
    }

    #[test]
    fn bracket_content_stays_raw() {
        let tokens = tokenize(r#"$[?@.a == 'x,y'][1:2]"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Bracket("?@.a == 'x,y'".into()),
                Token::Bracket("1:2".into()),
            ]
        );
    }

    #[test]
    fn recursive_wildcard_and_bracket() {
        assert_eq!(
            tokenize("$..*").unwrap(),
            vec![Token::Recursive, Token::Name("*".into())]
        );
        assert_eq!(
            tokenize("$..['k']").unwrap(),
            vec![Token::Recursive, Token::Bracket("'k'".into())]
        );
    }

    #[test]
    fn malformed_paths_are_rejected() {
        assert!(tokenize("a.b").is_err());
        assert!(tokenize("$x").is_err());
        assert!(tokenize("$[0").is_err());
        assert!(tokenize("$..").is_err());
        assert!(tokenize("$.").is_err());
    }
}
