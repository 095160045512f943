//! OpenAPI 3.1 type definitions
//!
//! These cover the parts of an OpenAPI document that the transformer builds or
//! merges. Anything it does not need to look inside (JSON Schema keywords,
//! examples, security schemes, ...) is carried verbatim as `serde_json::Value`
//! so documents pass through without loss.

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// OpenAPI version emitted by the transformer
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Media type used for generated request and response bodies
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// OpenAPI document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version (always "3.1.0" for generated documents)
    pub openapi: String,

    /// API metadata
    pub info: Info,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Reusable components
    #[serde(default)]
    pub components: Components,

    /// Remaining top-level fields (servers, tags, security, webhooks, x-*)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// API information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    /// API title
    pub title: String,

    /// API version
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<Value>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

/// Server information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, Value>>,
}

/// HTTP method of an operation within a path item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path item: the operations available on one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters shared by every operation on this path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOr<Parameter>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    /// Operations keyed by HTTP method
    #[serde(flatten)]
    pub operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    /// Path item holding a single operation
    pub fn with_operation(method: HttpMethod, operation: Operation) -> Self {
        let mut item = Self::default();
        item.operations.insert(method, operation);
        item
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation ID (unique identifier)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOr<Parameter>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOr<RequestBody>>,

    /// Responses keyed by status code
    #[serde(default)]
    pub responses: Responses,

    /// Summary, tags and the other fields that are carried as-is
    #[serde(flatten)]
    pub extras: OperationExtras,
}

/// Operation fields that are passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Tags (for grouping)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<IndexMap<String, Vec<String>>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Server>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<IndexMap<String, Value>>,

    /// Specification extensions (x-*) and any other unrecognised keys
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Parameter location in a generated interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// Parameter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter name
    pub name: String,

    /// Location: query, header, path, cookie
    #[serde(rename = "in")]
    pub location: ParameterLocation,

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
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: None,
            deprecated: None,
            allow_empty_value: None,
            style: None,
            explode: None,
            allow_reserved: None,
            schema: None,
            example: None,
            examples: None,
            content: None,
            extensions: IndexMap::new(),
        }
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content types
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl RequestBody {
    /// Required JSON request body carrying `schema`
    pub fn json(schema: SchemaOrRef) -> Self {
        let mut content = IndexMap::new();
        content.insert(JSON_MEDIA_TYPE.to_string(), MediaType::with_schema(schema));
        Self {
            content,
            required: Some(true),
            ..Default::default()
        }
    }
}

/// Responses keyed by status code
pub type Responses = IndexMap<StatusCode, RefOr<Response>>;

/// Response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, Value>>,

    /// Content types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, Value>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Media type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<IndexMap<String, Value>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl MediaType {
    pub fn with_schema(schema: SchemaOrRef) -> Self {
        Self {
            schema: Some(schema),
            ..Default::default()
        }
    }

    /// True when no media-type field is set
    pub fn is_empty(&self) -> bool {
        self.schema.is_none()
            && self.example.is_none()
            && self.examples.is_none()
            && self.encoding.is_none()
            && self.extensions.is_empty()
    }
}

/// Reference to a definition elsewhere in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// JSON pointer, e.g. `#/components/schemas/Widget`
    #[serde(rename = "$ref")]
    pub ref_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Keywords written next to `$ref` (`maxLength`, `deprecated`, `default`, ...)
    #[serde(flatten)]
    pub siblings: IndexMap<String, Value>,
}

impl Reference {
    pub fn new(ref_path: impl Into<String>) -> Self {
        Self {
            ref_path: ref_path.into(),
            summary: None,
            description: None,
            siblings: IndexMap::new(),
        }
    }
}

/// Either a `$ref` or an inline definition
///
/// The presence of `$ref` selects the `Reference` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Reference(Reference),
    Inline(T),
}

impl<T> RefOr<T> {
    pub fn reference(ref_path: impl Into<String>) -> Self {
        RefOr::Reference(Reference::new(ref_path))
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            RefOr::Reference(reference) => Some(reference),
            RefOr::Inline(_) => None,
        }
    }
}

impl<T> From<T> for RefOr<T> {
    fn from(value: T) -> Self {
        RefOr::Inline(value)
    }
}

/// Schema, reference to a schema, or a boolean schema
///
/// `true` accepts any instance and `false` none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Reference(Reference),
    Boolean(bool),
    Inline(Schema),
}

impl SchemaOrRef {
    pub fn reference(ref_path: impl Into<String>) -> Self {
        SchemaOrRef::Reference(Reference::new(ref_path))
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            SchemaOrRef::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

impl From<Schema> for SchemaOrRef {
    fn from(schema: Schema) -> Self {
        SchemaOrRef::Inline(schema)
    }
}

impl From<bool> for SchemaOrRef {
    fn from(value: bool) -> Self {
        SchemaOrRef::Boolean(value)
    }
}

/// JSON Schema `type`: a single name or a list of names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Union(Vec<String>),
}

impl SchemaType {
    pub fn includes(&self, name: &str) -> bool {
        match self {
            SchemaType::Single(t) => t == name,
            SchemaType::Union(types) => types.iter().any(|t| t == name),
        }
    }
}

/// Schema definition
///
/// Only the keywords the splitter needs are typed; the rest stay in
/// `keywords` in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// Properties (for object type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaOrRef>>,

    /// Required properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Every other keyword (items, enum, format, description, $id, ...)
    #[serde(flatten)]
    pub keywords: IndexMap<String, Value>,
}

impl Schema {
    /// Schema with only `type` set
    pub fn of_type(name: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(name.to_string())),
            ..Default::default()
        }
    }

    /// Object schema from ordered properties and the names of required ones
    pub fn object<I, S>(properties: I, required: &[&str]) -> Self
    where
        I: IntoIterator<Item = (S, SchemaOrRef)>,
        S: Into<String>,
    {
        Self {
            schema_type: Some(SchemaType::Single("object".to_string())),
            properties: Some(
                properties
                    .into_iter()
                    .map(|(name, schema)| (name.into(), schema))
                    .collect(),
            ),
            required: Some(required.iter().map(|s| s.to_string()).collect()),
            keywords: IndexMap::new(),
        }
    }

    /// Add an extra keyword, e.g. `items` or `description`
    pub fn with_keyword(mut self, key: &str, value: Value) -> Self {
        self.keywords.insert(key.to_string(), value);
        self
    }

    pub fn is_object(&self) -> bool {
        self.schema_type
            .as_ref()
            .is_some_and(|t| t.includes("object"))
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| required.iter().any(|name| name == field))
    }
}

/// Reusable components
///
/// The transformer passes this section through untouched; the typed maps are
/// the ones the resolver and builder work with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, RefOr<Response>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, RefOr<Parameter>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,

    /// errors, headers, securitySchemes, examples, links, ...
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

/// Response status code key ("200", "4XX", "default")
///
/// YAML documents usually write codes as bare integers, so both integer and
/// string keys are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code.to_string())
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        StatusCode(code.to_string())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StatusCodeVisitor;

        impl Visitor<'_> for StatusCodeVisitor {
            type Value = StatusCode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an HTTP status code")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<StatusCode, E> {
                Ok(StatusCode(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<StatusCode, E> {
                Ok(StatusCode(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<StatusCode, E> {
                Ok(StatusCode(v.to_string()))
            }
        }

        deserializer.deserialize_any(StatusCodeVisitor)
    }
}
