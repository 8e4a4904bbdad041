//! Core types for UBER document building.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// UBER+JSON format version written into every document.
pub const UBER_VERSION: &str = "1.0";

/// Properties skipped when introspecting a plain record.
///
/// `class` is the meta-property exposing a value's runtime type.
pub const RECORD_FILTER: &[&str] = &["class"];

/// Properties skipped when introspecting a link-bearing record.
///
/// `links` and `id` are already materialized as link nodes.
pub const LINK_BEARER_FILTER: &[&str] = &["class", "links", "id"];

/// Default nesting limit for [`BuildOptions`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// HTTP-style verb carried by an action descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    /// Parse a method name, ignoring case.
    ///
    /// Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "HEAD" => Some(HttpMethod::Head),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "TRACE" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// GET and DELETE: parameters travel in the query string.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }

    /// POST, PUT and PATCH: parameters travel as a form body.
    pub fn is_submission(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UBER action of a link node.
///
/// `Read` is the implicit default and is never rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UberAction {
    Append,
    Partial,
    #[default]
    Read,
    Remove,
    Replace,
}

impl UberAction {
    /// Map an HTTP method onto its UBER action.
    ///
    /// Returns `None` for methods UBER has no action for (HEAD, OPTIONS, TRACE).
    pub fn for_method(method: HttpMethod) -> Option<Self> {
        match method {
            HttpMethod::Get => Some(UberAction::Read),
            HttpMethod::Post => Some(UberAction::Append),
            HttpMethod::Put => Some(UberAction::Replace),
            HttpMethod::Patch => Some(UberAction::Partial),
            HttpMethod::Delete => Some(UberAction::Remove),
            HttpMethod::Head | HttpMethod::Options | HttpMethod::Trace => None,
        }
    }

    /// Parse an action token, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "append" => Some(UberAction::Append),
            "partial" => Some(UberAction::Partial),
            "read" => Some(UberAction::Read),
            "remove" => Some(UberAction::Remove),
            "replace" => Some(UberAction::Replace),
            _ => None,
        }
    }

    pub fn is_read(&self) -> bool {
        *self == UberAction::Read
    }
}

/// Options for building UBER nodes.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Fail with `CyclicGraph` when a value is re-entered while still on
    /// the traversal path.
    pub detect_cycles: bool,
    /// Maximum nesting depth, `None` for unlimited.
    pub max_depth: Option<usize>,
}

impl BuildOptions {
    /// Create options with cycle detection on and the default depth limit.
    pub fn new() -> Self {
        Self {
            detect_cycles: true,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }

    /// Enable or disable cycle detection.
    pub fn detect_cycles(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }

    /// Set the nesting limit (`None` removes it).
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}
