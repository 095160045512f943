//! Common types and utilities for the YARPC toolchain
//!
//! This crate contains the source (`RpcDocument`) and output (`OpenApiDocument`)
//! document models, the error type, and the injected logging capability used
//! across the parser, generator, and CLI components.

mod logger;
mod openapi;
mod rpc;

pub use logger::{Logger, NoopLogger, TracingLogger};
pub use openapi::*;
pub use rpc::*;

use std::fmt;
use thiserror::Error;

/// Errors that can occur while loading, transforming, or emitting documents
#[derive(Error, Debug)]
pub enum YarpcError {
    #[error("Missing required yarpc version")]
    MissingVersion,

    #[error("Unsupported YARPC version: {0}")]
    UnsupportedVersion(String),

    #[error("input schema must be an object type")]
    NotObjectSchema,

    #[error("input schema must have properties")]
    MissingProperties,

    #[error("Unsupported reference {0}")]
    UnsupportedReference(String),

    #[error("Could not resolve {reference}")]
    UnresolvedReference {
        reference: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Wraps a failure with the operation and phase that produced it
    #[error("Failed to transform {phase} for operation \"{operation_id}\"")]
    Operation {
        operation_id: String,
        phase: Phase,
        #[source]
        source: Box<YarpcError>,
    },

    #[error("Invalid response status code: {0}")]
    InvalidStatusCode(u16),

    #[error("Operation with id \"{operation_id}\" already exists")]
    DuplicateOperation {
        kind: OperationKind,
        operation_id: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Emit error: {0}")]
    Emit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl YarpcError {
    /// Attach operation context to an error raised while transforming it
    pub fn in_operation(self, operation_id: &str, phase: Phase) -> Self {
        YarpcError::Operation {
            operation_id: operation_id.to_string(),
            phase,
            source: Box::new(self),
        }
    }
}

/// Result type for YARPC operations
pub type Result<T> = std::result::Result<T, YarpcError>;

/// Stage of an operation transform, used for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Input,
    Responses,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Input => write!(f, "input"),
            Phase::Responses => write!(f, "responses"),
        }
    }
}
