//! An RFC 9535 JSONPath query engine over `serde_json` trees.
//!
//! Given a document and a path expression, [`find`] returns the ordered list
//! of matched nodes (duplicates allowed, order = document order of
//! traversal). The pipeline is one-way: path string → tokens → node-list
//! evaluation, with filter selectors (`?...`) evaluated per candidate and
//! extension functions (`length`, `count`, `match`, `search`, `value`)
//! dispatched through a pluggable [`Registry`].
//!
//! ```
//! use serde_json::json;
//!
//! let doc = r#"[{"name": "foo"}, {"name": "bar"}]"#;
//! let out = json_path_finder::find(doc, r#"$[?match(@.name, "f.*")].name"#).unwrap();
//! assert_eq!(out, vec![json!("foo")]);
//! ```

pub mod engine;
pub mod errors;
pub mod functions;

mod comparison;
mod evaluator;
mod filter;
mod parser;
mod path;
mod scalar;
mod tokenizer;

pub use engine::{find, find_reader, find_value, first, or_default, unique, Engine, PartialDecode};
pub use errors::{JsonPathError, Result};
pub use filter::FilterValue;
pub use functions::{FnArg, Function, Registry};
pub use path::JsonPath;
pub use tokenizer::{tokenize, Token};
