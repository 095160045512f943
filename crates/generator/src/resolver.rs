//! `$ref` resolution against the source document

use serde_json::{Map, Value};
use yarpc_common::{Reference, Result, RpcDocument, Schema, YarpcError};

/// Only local component references are resolved
const COMPONENTS_PREFIX: &str = "#/components/";

/// Resolves a schema reference to its definition
///
/// Implementations must be idempotent: the same reference always yields the
/// same schema.
pub trait RefResolver: Send + Sync {
    fn resolve(&self, reference: &Reference) -> Result<Schema>;
}

/// Default resolver, backed by a snapshot of the document's components
///
/// `#/components/schemas/Widget/properties/id` walks the components section
/// one segment at a time with exact key lookup (array items by index).
#[derive(Debug, Clone)]
pub struct ComponentsResolver {
    root: Value,
}

impl ComponentsResolver {
    pub fn new(doc: &RpcDocument) -> Result<Self> {
        let mut root = Map::new();
        root.insert(
            "components".to_string(),
            serde_json::to_value(&doc.components)?,
        );

        Ok(Self {
            root: Value::Object(root),
        })
    }
}

impl RefResolver for ComponentsResolver {
    fn resolve(&self, reference: &Reference) -> Result<Schema> {
        let ref_path = reference.ref_path.as_str();
        if !ref_path.starts_with(COMPONENTS_PREFIX) {
            return Err(YarpcError::UnsupportedReference(ref_path.to_string()));
        }

        let unresolved = |source| YarpcError::UnresolvedReference {
            reference: ref_path.to_string(),
            source,
        };

        let target = ref_path[2..]
            .split('/')
            .try_fold(&self.root, lookup)
            .filter(|value| is_truthy(value))
            .ok_or_else(|| unresolved(None))?;

        serde_json::from_value(target.clone()).map_err(|e| unresolved(Some(e)))
    }
}

fn lookup<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
