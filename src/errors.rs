use thiserror::Error;

/// Errors surfaced by a `find` call.
///
/// `MalformedJson` and `InvalidPath` are structural: the inputs never made it
/// to evaluation. `Query` is a semantic hard error raised mid-evaluation
/// (leading-zero index, non-singular operand, unknown function, ...). A
/// selector that merely matches nothing is not an error of any kind.
#[derive(Debug, Error)]
pub enum JsonPathError {
    #[error("malformed json: {0}")]
    MalformedJson(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("query error: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, JsonPathError>;
