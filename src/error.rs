//! Error types for UBER document building, input loading and validation.

use std::path::PathBuf;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure raised by an accessor on a value being converted.
///
/// Returned by [`Introspect`](crate::Introspect) implementations and the
/// capability traits when reading content, links or a property fails.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AccessError {
    message: String,
    #[source]
    source: Option<BoxedSource>,
}

impl AccessError {
    /// Create an access error with a message and no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an access error wrapping an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Error for a property name the record does not expose.
    pub fn unknown_property(name: &str) -> Self {
        Self::new(format!("no readable property '{}'", name))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors while converting a value into UBER nodes.
///
/// None of these are recovered from inside the traversal: the first failure
/// aborts the whole build and no partial tree is returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unsupported root type {type_name}: expected a resource, collection or map")]
    UnsupportedRootType { type_name: String },

    #[error("failed to transform {type_name} at {path}: {source}")]
    Introspection {
        type_name: String,
        path: String,
        #[source]
        source: AccessError,
    },

    #[error("cyclic object graph: {type_name} at {path} is already being converted")]
    CyclicGraph { type_name: String, path: String },

    #[error("maximum depth {max_depth} exceeded at {path}")]
    DepthExceeded { max_depth: usize, path: String },

    #[error("HTTP method {method} of link '{href}' has no UBER action")]
    UnsupportedMethod { method: String, href: String },

    #[error("cannot serialize UBER document: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading an input document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors while validating a rendered UBER document.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
