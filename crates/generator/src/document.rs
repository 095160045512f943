//! Whole-document transformation: RPC operations become OpenAPI paths

use crate::operation::OperationTransformer;
use crate::resolver::{ComponentsResolver, RefResolver};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::sync::Arc;
use yarpc_common::{
    HttpMethod, Logger, OpenApiDocument, Operation, OperationDef, OperationKind, PathItem, Result,
    RpcDocument, TracingLogger, YarpcError, OPENAPI_VERSION, SUPPORTED_YARPC_VERSION,
};

/// Options for a document transform
///
/// Everything defaults: a resolver over the document's own components, the
/// `tracing` logger, and an operation transformer built from those two.
#[derive(Default)]
pub struct TransformerOptions {
    logger: Option<Arc<dyn Logger>>,
    resolver: Option<Box<dyn RefResolver>>,
    operation_transformer: Option<OperationTransformer>,
}

impl TransformerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn RefResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Use a preconfigured operation transformer; the resolver option is
    /// ignored when this is set
    pub fn with_operation_transformer(mut self, transformer: OperationTransformer) -> Self {
        self.operation_transformer = Some(transformer);
        self
    }
}

/// Document transformer
pub struct DocumentTransformer<'a> {
    doc: &'a RpcDocument,
    operations: OperationTransformer,
    logger: Arc<dyn Logger>,
}

impl<'a> DocumentTransformer<'a> {
    /// Checks the protocol version before any collaborator is built
    pub fn new(doc: &'a RpcDocument, options: TransformerOptions) -> Result<Self> {
        validate_version(doc.version())?;

        let logger: Arc<dyn Logger> = match options.logger {
            Some(logger) => logger,
            None => Arc::new(TracingLogger),
        };

        let operations = match options.operation_transformer {
            Some(transformer) => transformer,
            None => {
                let resolver: Box<dyn RefResolver> = match options.resolver {
                    Some(resolver) => resolver,
                    None => Box::new(ComponentsResolver::new(doc)?),
                };
                OperationTransformer::new(resolver).with_logger(logger.clone())
            }
        };

        Ok(Self {
            doc,
            operations,
            logger,
        })
    }

    /// Transform `doc` in one call
    pub fn transform(doc: &RpcDocument, options: TransformerOptions) -> Result<OpenApiDocument> {
        DocumentTransformer::new(doc, options)?.run()
    }

    pub fn run(&self) -> Result<OpenApiDocument> {
        let derived = self.derive_paths()?;
        let paths = self.merge_paths(self.doc.paths.clone().unwrap_or_default(), derived);

        Ok(OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.doc.info.clone(),
            paths,
            components: self.doc.components.clone(),
            extra: self.passthrough_fields(),
        })
    }

    /// Top-level source fields copied to the output
    ///
    /// A source `openapi` key is dropped; the output version is always ours.
    fn passthrough_fields(&self) -> IndexMap<String, Value> {
        let mut extra = self.doc.extra.clone();
        if let Some(version) = extra.shift_remove("openapi") {
            self.logger.debug(
                &json!({ "openapi": version }),
                "Ignoring openapi version from source document",
            );
        }
        extra
    }

    /// Paths for every declared operation, queries first
    fn derive_paths(&self) -> Result<IndexMap<String, PathItem>> {
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();

        let declared = self
            .doc
            .operations
            .queries
            .iter()
            .map(|(id, def)| (OperationKind::Query, id, def))
            .chain(
                self.doc
                    .operations
                    .mutations
                    .iter()
                    .map(|(id, def)| (OperationKind::Mutation, id, def)),
            );

        for (kind, operation_id, def) in declared {
            let (path, method, operation) = self.derive_operation(kind, operation_id, def)?;

            let item = paths.entry(path.clone()).or_default();
            if item.operations.contains_key(&method) {
                self.logger.warn(
                    &json!({ "path": path, "duplicate": [method.as_str()] }),
                    "Duplicate operation(s) will be overwritten",
                );
            }
            item.operations.insert(method, operation);
        }

        Ok(paths)
    }

    fn derive_operation(
        &self,
        kind: OperationKind,
        operation_id: &str,
        def: &OperationDef,
    ) -> Result<(String, HttpMethod, Operation)> {
        let message = match kind {
            OperationKind::Query => "Transforming query",
            OperationKind::Mutation => "Transforming mutation",
        };
        self.logger.debug(
            &json!({ "operationId": operation_id, "kind": kind.to_string() }),
            message,
        );

        let path = def
            .path
            .clone()
            .unwrap_or_else(|| kind.default_path(operation_id));
        let method = def.method.unwrap_or_else(|| kind.default_method());
        let operation = self.operations.transform(kind, operation_id, def)?;

        Ok((path, method, operation))
    }

    /// Merge generated paths into the hand-written ones
    ///
    /// Path-level fields of a hand-written path are kept. Where both sides
    /// define the same method the generated operation wins.
    fn merge_paths(
        &self,
        mut base: IndexMap<String, PathItem>,
        derived: IndexMap<String, PathItem>,
    ) -> IndexMap<String, PathItem> {
        self.logger.debug(
            &json!({
                "base": base.keys().collect::<Vec<_>>(),
                "derived": derived.keys().collect::<Vec<_>>(),
            }),
            "Merging paths",
        );

        for (path, item) in derived {
            match base.get_mut(&path) {
                Some(existing) => {
                    let duplicate: Vec<&str> = item
                        .operations
                        .keys()
                        .filter(|method| existing.operations.contains_key(*method))
                        .map(|method| method.as_str())
                        .collect();
                    if !duplicate.is_empty() {
                        self.logger.warn(
                            &json!({ "path": path, "duplicate": duplicate }),
                            "Duplicate operation(s) will be overwritten",
                        );
                    }
                    existing.operations.extend(item.operations);
                }
                None => {
                    base.insert(path, item);
                }
            }
        }

        base
    }
}

fn validate_version(version: Option<&str>) -> Result<()> {
    match version {
        None => Err(YarpcError::MissingVersion),
        Some(SUPPORTED_YARPC_VERSION) => Ok(()),
        Some(other) => Err(YarpcError::UnsupportedVersion(other.to_string())),
    }
}
