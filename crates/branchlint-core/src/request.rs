//! The transport-boundary request shape.
//!
//! Callers send either `{ "nodes": [...], "edges": [...] }` or a bare array
//! of nodes. Edges are accepted for convenience and ignored: the engine
//! derives every edge from node slots.

use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::InputError;
use crate::model::Node;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationRequest {
    pub nodes: Vec<Node>,
    /// Editor-side edge list. Carried through, never read by the engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Value>,
}

impl ValidationRequest {
    /// Parse a request from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the payload is not JSON, is neither an
    /// object nor an array, or contains nodes that do not match the schema.
    pub fn from_json(input: &str) -> Result<Self, InputError> {
        let value: Value = serde_json::from_str(input).map_err(InputError::Json)?;
        Self::from_value(value)
    }

    /// Parse a request from any reader (file, stdin).
    ///
    /// # Errors
    ///
    /// Same as [`ValidationRequest::from_json`].
    pub fn from_reader(reader: impl Read) -> Result<Self, InputError> {
        let value: Value = serde_json::from_reader(reader).map_err(InputError::Json)?;
        Self::from_value(value)
    }

    /// Parse a request from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Same as [`ValidationRequest::from_json`].
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        let request = match value {
            Value::Array(_) => Self {
                nodes: serde_json::from_value(value).map_err(InputError::Schema)?,
                edges: Vec::new(),
            },
            Value::Object(_) => serde_json::from_value(value).map_err(InputError::Schema)?,
            other => {
                return Err(InputError::UnexpectedShape {
                    found: json_type_name(&other),
                });
            }
        };

        debug!(
            nodes = request.nodes.len(),
            ignored_edges = request.edges.len(),
            "parsed validation request"
        );
        Ok(request)
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
