//! YARPC source document types
//!
//! A YARPC document is an OpenAPI document whose operations are declared as
//! named queries and mutations instead of paths.

use crate::openapi::{
    Components, HttpMethod, Info, MediaType, OperationExtras, ParameterLocation, PathItem,
    Responses, SchemaOrRef,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The only YARPC protocol version the transformer accepts
pub const SUPPORTED_YARPC_VERSION: &str = "1.0.0";

/// YARPC document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcDocument {
    /// Protocol version, must be the string "1.0.0"
    ///
    /// Kept as a raw value so a non-string version (`yarpc: 2`) loads and is
    /// reported as missing instead of failing the parse.
    #[serde(alias = "version", default, skip_serializing_if = "Option::is_none")]
    pub yarpc: Option<Value>,

    /// API metadata
    pub info: Info,

    /// Reusable components, passed through to the generated document
    #[serde(default)]
    pub components: Components,

    /// Declared queries and mutations
    #[serde(default)]
    pub operations: RpcOperations,

    /// Hand-written paths that generated operations are merged into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<IndexMap<String, PathItem>>,

    /// Remaining top-level fields (servers, tags, security, webhooks, x-*)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl RpcDocument {
    /// Declared protocol version, if it is a string
    pub fn version(&self) -> Option<&str> {
        self.yarpc.as_ref().and_then(Value::as_str)
    }
}

/// Queries and mutations in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcOperations {
    #[serde(default)]
    pub queries: IndexMap<String, OperationDef>,

    #[serde(default)]
    pub mutations: IndexMap<String, OperationDef>,
}

/// Kind of RPC operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Read-only operation
    Query,
    /// Side-effecting operation
    Mutation,
}

impl OperationKind {
    /// HTTP method used when the operation does not declare one
    pub fn default_method(self) -> HttpMethod {
        match self {
            OperationKind::Query => HttpMethod::Get,
            OperationKind::Mutation => HttpMethod::Post,
        }
    }

    /// Path used when the operation does not declare one
    pub fn default_path(self, operation_id: &str) -> String {
        match self {
            OperationKind::Query => format!("/queries/{}", operation_id),
            OperationKind::Mutation => format!("/mutations/{}", operation_id),
        }
    }

    /// Where input fields go unless overridden
    pub fn default_location(self) -> InputLocation {
        match self {
            OperationKind::Query => InputLocation::Query,
            OperationKind::Mutation => InputLocation::Body,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
        }
    }
}

/// RPC operation definition
///
/// # Example
/// ```yaml
/// createWidget:
///   description: Create a widget
///   path: /users/{userId}/widgets
///   input:
///     schema: { $ref: "#/components/schemas/CreateWidgetInput" }
///     parameters:
///       userId: { in: path }
///   output:
///     statusCode: 201
///     schema: { $ref: "#/components/schemas/Widget" }
///   errors:
///     400: { $ref: "#/components/responses/BadRequest" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Overrides the kind's default HTTP method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,

    /// Overrides the kind's default path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputDef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDef>,

    /// Error responses, merged over the success response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Responses>,

    /// OpenAPI operation fields copied onto the generated operation
    #[serde(flatten)]
    pub extras: OperationExtras,
}

/// Operation input: an object schema plus per-field placement overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDef {
    pub schema: SchemaOrRef,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterOverride>,
}

impl InputDef {
    pub fn new(schema: SchemaOrRef) -> Self {
        Self {
            schema,
            parameters: IndexMap::new(),
        }
    }

    pub fn with_override(mut self, field: &str, parameter: ParameterOverride) -> Self {
        self.parameters.insert(field.to_string(), parameter);
        self
    }
}

/// Where an input field is carried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl InputLocation {
    /// Parameter location, or `None` for the request body
    pub fn parameter_location(self) -> Option<ParameterLocation> {
        match self {
            InputLocation::Path => Some(ParameterLocation::Path),
            InputLocation::Query => Some(ParameterLocation::Query),
            InputLocation::Header => Some(ParameterLocation::Header),
            InputLocation::Cookie => Some(ParameterLocation::Cookie),
            InputLocation::Body => None,
        }
    }
}

impl fmt::Display for InputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputLocation::Path => "path",
            InputLocation::Query => "query",
            InputLocation::Header => "header",
            InputLocation::Cookie => "cookie",
            InputLocation::Body => "body",
        };
        f.write_str(name)
    }
}

/// Per-field parameter override
///
/// Any OpenAPI parameter attribute except `name` and `schema`, which always
/// come from the input schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterOverride {
    /// Placement for this field
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<InputLocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl ParameterOverride {
    /// Override that only moves the field
    pub fn located(location: InputLocation) -> Self {
        Self {
            location: Some(location),
            ..Default::default()
        }
    }
}

/// Successful response definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDef {
    /// Defaults to "OK"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Defaults to 200
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Media type of the JSON body, if any
    #[serde(flatten)]
    pub media: MediaType,
}

impl OutputDef {
    pub fn with_schema(schema: SchemaOrRef) -> Self {
        Self {
            media: MediaType::with_schema(schema),
            ..Default::default()
        }
    }
}
