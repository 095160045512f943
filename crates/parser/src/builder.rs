//! Programmatic construction of YARPC documents

use indexmap::IndexMap;
use yarpc_common::{
    Components, Info, OperationDef, OperationKind, PathItem, RefOr, Response, Result,
    RpcDocument, RpcOperations, SchemaOrRef, YarpcError, SUPPORTED_YARPC_VERSION,
};

/// Builds an `RpcDocument` one operation at a time
///
/// Operation ids must be unique within queries and within mutations; a
/// duplicate is rejected rather than replacing the earlier definition.
///
/// # Example
/// ```rust,ignore
/// let mut builder = ServiceBuilder::new(Info::new("Widgets API", "1.0.0"))
///     .with_schema("Widget", widget_schema);
/// builder.add_query("getWidget", get_widget)?;
/// let doc = builder.build();
/// ```
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    info: Info,
    components: Components,
    paths: Option<IndexMap<String, PathItem>>,
    operations: RpcOperations,
}

impl ServiceBuilder {
    pub fn new(info: Info) -> Self {
        Self {
            info,
            components: Components::default(),
            paths: None,
            operations: RpcOperations::default(),
        }
    }

    /// Register a schema under `#/components/schemas/<name>`
    pub fn with_schema(mut self, name: &str, schema: impl Into<SchemaOrRef>) -> Self {
        self.components
            .schemas
            .insert(name.to_string(), schema.into());
        self
    }

    /// Register a response under `#/components/responses/<name>`
    pub fn with_response(mut self, name: &str, response: Response) -> Self {
        self.components
            .responses
            .insert(name.to_string(), RefOr::Inline(response));
        self
    }

    /// Add a hand-written path that generated operations are merged into
    pub fn with_path(mut self, path: &str, item: PathItem) -> Self {
        self.paths
            .get_or_insert_with(IndexMap::new)
            .insert(path.to_string(), item);
        self
    }

    pub fn add_query(&mut self, operation_id: &str, operation: OperationDef) -> Result<&mut Self> {
        self.add_operation(OperationKind::Query, operation_id, operation)
    }

    pub fn add_mutation(
        &mut self,
        operation_id: &str,
        operation: OperationDef,
    ) -> Result<&mut Self> {
        self.add_operation(OperationKind::Mutation, operation_id, operation)
    }

    fn add_operation(
        &mut self,
        kind: OperationKind,
        operation_id: &str,
        operation: OperationDef,
    ) -> Result<&mut Self> {
        let operations = match kind {
            OperationKind::Query => &mut self.operations.queries,
            OperationKind::Mutation => &mut self.operations.mutations,
        };

        if operations.contains_key(operation_id) {
            return Err(YarpcError::DuplicateOperation {
                kind,
                operation_id: operation_id.to_string(),
            });
        }

        operations.insert(operation_id.to_string(), operation);
        Ok(self)
    }

    pub fn queries(&self) -> &IndexMap<String, OperationDef> {
        &self.operations.queries
    }

    pub fn mutations(&self) -> &IndexMap<String, OperationDef> {
        &self.operations.mutations
    }

    /// Finish the document, stamped with the supported protocol version
    pub fn build(self) -> RpcDocument {
        RpcDocument {
            yarpc: Some(SUPPORTED_YARPC_VERSION.into()),
            info: self.info,
            components: self.components,
            operations: self.operations,
            paths: self.paths,
            extra: IndexMap::new(),
        }
    }
}
