use std::io::Read;
use std::sync::Arc;

use itertools::Itertools;
use serde_json::Value;
use tracing::debug;

use crate::errors::{JsonPathError, Result};
use crate::evaluator;
use crate::functions::Registry;
use crate::path::JsonPath;
use crate::tokenizer;

/// =========================
/// Public API (façade)
/// =========================

/// Pluggable minimal-sub-document decoder. A collaborator implementing this
/// may inspect the path (e.g. via [`crate::tokenize`]) and decode only the
/// portion of the source the path can reach; the returned tree must still
/// evaluate correctly under the full path. `None` means the optimization did
/// not apply and the engine falls back to a full decode.
pub trait PartialDecode: Send + Sync {
    fn decode(&self, source: &str, path: &JsonPath) -> Option<Value>;
}

/// The main entry point. Owns the function registry (extension functions
/// are pluggable) and an optional partial-decode collaborator. Evaluation is
/// a pure computation: no state survives a call, and concurrent calls over
/// the same tree are safe.
#[derive(Clone)]
pub struct Engine {
    registry: Registry,
    partial: Option<Arc<dyn PartialDecode>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            registry: Registry::with_builtins(),
            partial: None,
        }
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            partial: None,
        }
    }

    pub fn with_partial_decode(mut self, decoder: Arc<dyn PartialDecode>) -> Self {
        self.partial = Some(decoder);
        self
    }

    /// Decode `json` and return every node `path` matches, in document
    /// order. Duplicates are legal; "no match" is an empty list, not an
    /// error.
    pub fn find(&self, json: &str, path: &str) -> Result<Vec<Value>> {
        let path = JsonPath::new(path)?;
        if let Some(decoder) = &self.partial {
            if let Some(doc) = decoder.decode(json, &path) {
                debug!(path = %path, "using partially decoded sub-document");
                return self.query(&doc, &path);
            }
        }
        let doc: Value = serde_json::from_str(json)
            .map_err(|e| JsonPathError::MalformedJson(e.to_string()))?;
        self.query(&doc, &path)
    }

    /// Same as [`Engine::find`] over a pre-decoded tree.
    pub fn find_value(&self, doc: &Value, path: &str) -> Result<Vec<Value>> {
        self.query(doc, &JsonPath::new(path)?)
    }

    /// Same as [`Engine::find`] over a streaming source. The source is
    /// buffered; any partial-decode failure falls back to the full decode.
    pub fn find_reader<R: Read>(&self, mut reader: R, path: &str) -> Result<Vec<Value>> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|e| JsonPathError::MalformedJson(e.to_string()))?;
        self.find(&buf, path)
    }

    pub fn query(&self, doc: &Value, path: &JsonPath) -> Result<Vec<Value>> {
        let tokens = tokenizer::tokenize(path.as_str())?;
        debug!(path = %path, tokens = tokens.len(), "evaluating");
        let nodes = evaluator::eval_tokens(&tokens, doc, &self.registry)?;
        Ok(nodes.into_iter().cloned().collect())
    }
}

/// Convenience: parse a JSON string and evaluate `path` with the builtin
/// registry.
pub fn find(json: &str, path: &str) -> Result<Vec<Value>> {
    Engine::new().find(json, path)
}

/// Evaluate `path` against an already-decoded tree.
pub fn find_value(doc: &Value, path: &str) -> Result<Vec<Value>> {
    Engine::new().find_value(doc, path)
}

/// Evaluate `path` against a streaming source.
pub fn find_reader<R: Read>(reader: R, path: &str) -> Result<Vec<Value>> {
    Engine::new().find_reader(reader, path)
}

/// =========================
/// Result helpers
/// =========================

/// First match, or null.
pub fn first(matches: &[Value]) -> Value {
    matches.first().cloned().unwrap_or(Value::Null)
}

/// Deduplicate a match list, keeping first occurrences in order.
pub fn unique(matches: &[Value]) -> Vec<Value> {
    matches
        .iter()
        .cloned()
        .unique_by(|v| serde_json::to_string(v).unwrap_or_default())
        .collect()
}

/// If `matches` is empty, return the parsed default JSON string (or the raw
/// string when it is not valid JSON); else the matches as an array.
pub fn or_default(matches: &[Value], default_json: &str) -> Value {
    if matches.is_empty() {
        serde_json::from_str::<Value>(default_json)
            .unwrap_or_else(|_| Value::String(default_json.to_string()))
    } else {
        Value::Array(matches.to_vec())
    }
}
