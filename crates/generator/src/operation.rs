//! Transforms a single query or mutation into an OpenAPI operation

use crate::parameters::{split_input, SplitInput};
use crate::resolver::RefResolver;
use indexmap::IndexMap;
use serde_json::json;
use std::borrow::Cow;
use std::sync::Arc;
use yarpc_common::{
    InputDef, InputLocation, Logger, NoopLogger, Operation, OperationDef, OperationExtras,
    OperationKind, OutputDef, Phase, RefOr, Response, Responses, Result, SchemaOrRef, StatusCode,
    YarpcError, JSON_MEDIA_TYPE,
};

/// Status code of the success response when the output does not set one
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// Description of the success response when the output does not set one
pub const DEFAULT_DESCRIPTION: &str = "OK";

/// Keys the transformer computes itself; passthrough never overrides them
const COMPUTED_KEYS: [&str; 4] = ["operationId", "parameters", "requestBody", "responses"];

/// Operation transformer
///
/// Queries default their input fields to query parameters, mutations to the
/// request body.
pub struct OperationTransformer {
    resolver: Box<dyn RefResolver>,
    logger: Arc<dyn Logger>,
}

impl OperationTransformer {
    pub fn new(resolver: Box<dyn RefResolver>) -> Self {
        Self {
            resolver,
            logger: Arc::new(NoopLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Transform a query operation into an OpenAPI operation
    ///
    /// # Example
    /// ```rust,ignore
    /// // listUserWidgets:
    /// //   description: List widgets for a user
    /// //   input:  { schema: { $ref: "#/components/schemas/ListUserWidgetsInput" } }
    /// //   output: { schema: { $ref: "#/components/schemas/ListWidgetsOutput" } }
    /// //   errors: { 400: { $ref: "#/components/responses/BadRequest" } }
    /// let operation = transformer.transform_query("listUserWidgets", &def)?;
    /// // operationId: listUserWidgets
    /// // parameters: [userId (query, required), status (query), limit (query)]
    /// // responses:
    /// //   200: { description: OK, content: { application/json: { schema: ListWidgetsOutput } } }
    /// //   400: { $ref: "#/components/responses/BadRequest" }
    /// ```
    pub fn transform_query(&self, operation_id: &str, operation: &OperationDef) -> Result<Operation> {
        self.transform(OperationKind::Query, operation_id, operation)
    }

    /// Transform a mutation operation into an OpenAPI operation
    pub fn transform_mutation(
        &self,
        operation_id: &str,
        operation: &OperationDef,
    ) -> Result<Operation> {
        self.transform(OperationKind::Mutation, operation_id, operation)
    }

    pub fn transform(
        &self,
        kind: OperationKind,
        operation_id: &str,
        operation: &OperationDef,
    ) -> Result<Operation> {
        let default_location = kind.default_location();
        self.logger.debug(
            &json!({
                "operationId": operation_id,
                "kind": kind.to_string(),
                "operation": serde_json::to_value(operation).unwrap_or_default(),
                "parameterDefaults": { "in": default_location.to_string() },
            }),
            &format!("Transforming operation \"{}\"", operation_id),
        );

        let split = match &operation.input {
            Some(input) => self
                .transform_input(input, default_location)
                .map_err(|e| e.in_operation(operation_id, Phase::Input))?,
            None => SplitInput::default(),
        };

        let responses = build_responses(operation.output.as_ref(), operation.errors.as_ref())
            .map_err(|e| e.in_operation(operation_id, Phase::Responses))?;

        Ok(Operation {
            operation_id: Some(operation_id.to_string()),
            description: operation
                .description
                .clone()
                .filter(|description| !description.is_empty()),
            parameters: split
                .parameters
                .map(|parameters| parameters.into_iter().map(RefOr::Inline).collect()),
            request_body: split.request_body.map(RefOr::Inline),
            responses,
            extras: self.passthrough(operation_id, &operation.extras),
        })
    }

    fn transform_input(&self, input: &InputDef, default_location: InputLocation) -> Result<SplitInput> {
        self.logger.debug(
            &json!({
                "input": serde_json::to_value(input).unwrap_or_default(),
                "defaults": { "in": default_location.to_string() },
            }),
            "Transforming input",
        );

        let schema = match &input.schema {
            SchemaOrRef::Reference(reference) => Cow::Owned(self.resolver.resolve(reference)?),
            SchemaOrRef::Inline(schema) => Cow::Borrowed(schema),
            SchemaOrRef::Boolean(_) => return Err(YarpcError::NotObjectSchema),
        };

        split_input(&input.schema, &schema, default_location, &input.parameters)
    }

    /// Passthrough fields minus anything that would shadow a computed key
    fn passthrough(&self, operation_id: &str, extras: &OperationExtras) -> OperationExtras {
        let mut extras = extras.clone();
        let before = extras.extensions.len();
        extras
            .extensions
            .retain(|key, _| !COMPUTED_KEYS.contains(&key.as_str()));

        if extras.extensions.len() != before {
            self.logger.debug(
                &json!({ "operationId": operation_id }),
                "Ignoring passthrough fields that shadow generated ones",
            );
        }
        extras
    }
}

/// Build the responses map for an operation
///
/// The success entry comes from `output`; declared `errors` are merged on
/// top and replace the success entry outright if they reuse its status code.
pub fn build_responses(output: Option<&OutputDef>, errors: Option<&Responses>) -> Result<Responses> {
    let default_output = OutputDef::default();
    let output = output.unwrap_or(&default_output);

    let status_code = output.status_code.unwrap_or(DEFAULT_STATUS_CODE);
    if !(100..=599).contains(&status_code) {
        return Err(YarpcError::InvalidStatusCode(status_code));
    }

    let mut success = Response::new(
        output
            .description
            .as_deref()
            .unwrap_or(DEFAULT_DESCRIPTION),
    );
    if !output.media.is_empty() {
        let mut content = IndexMap::new();
        content.insert(JSON_MEDIA_TYPE.to_string(), output.media.clone());
        success.content = Some(content);
    }

    let mut responses = Responses::new();
    responses.insert(StatusCode::from(status_code), RefOr::Inline(success));

    if let Some(errors) = errors {
        for (code, response) in errors {
            responses.insert(code.clone(), response.clone());
        }
    }

    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::error::Error as _;
    use yarpc_common::{
        MediaType, Parameter, ParameterLocation, ParameterOverride, Reference, RequestBody, Schema,
    };

    mockall::mock! {
        pub Resolver {}

        impl RefResolver for Resolver {
            fn resolve(&self, reference: &Reference) -> Result<Schema>;
        }
    }

    mockall::mock! {
        pub Sink {}

        impl Logger for Sink {
            fn debug(&self, context: &Value, message: &str);
            fn warn(&self, context: &Value, message: &str);
        }
    }

    const CREATE_WIDGET_INPUT: &str = "#/components/schemas/CreateWidgetInput";

    fn create_widget_input() -> Schema {
        Schema::object(
            [
                ("userId", SchemaOrRef::reference("#/components/schemas/UserID")),
                ("status", SchemaOrRef::reference("#/components/schemas/WidgetStatus")),
            ],
            &["userId", "status"],
        )
    }

    fn create_widget() -> OperationDef {
        let mut errors = Responses::new();
        errors.insert(
            StatusCode::from(400),
            RefOr::reference("#/components/responses/BadRequest"),
        );

        OperationDef {
            description: Some("Create a widget".to_string()),
            input: Some(InputDef::new(SchemaOrRef::reference(CREATE_WIDGET_INPUT))),
            output: Some(OutputDef::with_schema(SchemaOrRef::reference(
                "#/components/schemas/Widget",
            ))),
            errors: Some(errors),
            ..Default::default()
        }
    }

    fn resolving_create_widget_input() -> MockResolver {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve()
            .with(eq(Reference::new(CREATE_WIDGET_INPUT)))
            .returning(|_| Ok(create_widget_input()));
        resolver
    }

    fn transformer(resolver: MockResolver) -> OperationTransformer {
        OperationTransformer::new(Box::new(resolver))
    }

    #[test]
    fn test_transform_create_widget() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(create_widget_input()));

        let actual = transformer(resolver)
            .transform_mutation("createWidget", &create_widget())
            .unwrap();

        let mut success_content = IndexMap::new();
        success_content.insert(
            JSON_MEDIA_TYPE.to_string(),
            MediaType::with_schema(SchemaOrRef::reference("#/components/schemas/Widget")),
        );
        let mut success = Response::new("OK");
        success.content = Some(success_content);

        let mut responses = Responses::new();
        responses.insert(StatusCode::from(200), RefOr::Inline(success));
        responses.insert(
            StatusCode::from(400),
            RefOr::reference("#/components/responses/BadRequest"),
        );

        let expected = Operation {
            operation_id: Some("createWidget".to_string()),
            description: Some("Create a widget".to_string()),
            parameters: None,
            request_body: Some(RefOr::Inline(RequestBody::json(SchemaOrRef::reference(
                CREATE_WIDGET_INPUT,
            )))),
            responses,
            extras: OperationExtras::default(),
        };

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_mutation_moves_field_to_path() {
        let mut operation = create_widget();
        operation.input = Some(
            InputDef::new(SchemaOrRef::reference(CREATE_WIDGET_INPUT)).with_override(
                "userId",
                ParameterOverride::located(InputLocation::Path),
            ),
        );

        let actual = transformer(resolving_create_widget_input())
            .transform_mutation("createWidget", &operation)
            .unwrap();

        let mut expected_parameter = Parameter::new("userId", ParameterLocation::Path);
        expected_parameter.required = Some(true);
        expected_parameter.schema = Some(SchemaOrRef::reference("#/components/schemas/UserID"));
        assert_eq!(
            actual.parameters,
            Some(vec![RefOr::Inline(expected_parameter)])
        );

        let expected_body = Schema::object(
            [(
                "status",
                SchemaOrRef::reference("#/components/schemas/WidgetStatus"),
            )],
            &["status"],
        );
        assert_eq!(
            actual.request_body,
            Some(RefOr::Inline(RequestBody::json(SchemaOrRef::Inline(
                expected_body
            ))))
        );
    }

    #[test]
    fn test_query_with_inline_schema_skips_resolver() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().never();

        let operation = OperationDef {
            input: Some(InputDef::new(create_widget_input().into())),
            ..Default::default()
        };
        let actual = transformer(resolver)
            .transform_query("getWidget", &operation)
            .unwrap();

        let parameters = actual.parameters.unwrap();
        assert_eq!(parameters.len(), 2);
        assert!(actual.request_body.is_none());
        assert!(actual.description.is_none());
    }

    #[test]
    fn test_no_input_and_no_output() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().never();

        let actual = transformer(resolver)
            .transform_query("health", &OperationDef::default())
            .unwrap();

        assert!(actual.parameters.is_none());
        assert!(actual.request_body.is_none());
        assert_eq!(
            serde_json::to_value(&actual).unwrap(),
            json!({
                "operationId": "health",
                "responses": { "200": { "description": "OK" } }
            })
        );
    }

    #[test]
    fn test_output_overrides_status_and_description() {
        let operation = OperationDef {
            output: Some(OutputDef {
                description: Some("No content".to_string()),
                status_code: Some(204),
                media: MediaType::default(),
            }),
            ..Default::default()
        };

        let actual = transformer(MockResolver::new())
            .transform_query("deepHealthCheck", &operation)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&actual.responses).unwrap(),
            json!({ "204": { "description": "No content" } })
        );
    }

    #[test]
    fn test_declared_error_overwrites_success_response() {
        let mut errors = Responses::new();
        errors.insert(
            StatusCode::from(200),
            RefOr::reference("#/components/responses/Custom"),
        );
        let output = OutputDef::with_schema(SchemaOrRef::reference("#/components/schemas/Widget"));

        let responses = build_responses(Some(&output), Some(&errors)).unwrap();

        // full replacement, not a merge of the two entries
        assert_eq!(responses.len(), 1);
        assert_eq!(
            responses[&StatusCode::from(200)],
            RefOr::reference("#/components/responses/Custom")
        );
    }

    #[test]
    fn test_invalid_status_code_is_wrapped() {
        let operation = OperationDef {
            output: Some(OutputDef {
                status_code: Some(42),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = transformer(MockResolver::new())
            .transform_query("broken", &operation)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to transform responses for operation \"broken\""
        );
        assert_eq!(
            err.source().unwrap().to_string(),
            "Invalid response status code: 42"
        );
    }

    #[test]
    fn test_resolver_failure_is_wrapped() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().returning(|reference| {
            Err(YarpcError::UnresolvedReference {
                reference: reference.ref_path.clone(),
                source: None,
            })
        });

        let err = transformer(resolver)
            .transform_mutation("createWidget", &create_widget())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to transform input for operation \"createWidget\""
        );
        assert_eq!(
            err.source().unwrap().to_string(),
            "Could not resolve #/components/schemas/CreateWidgetInput"
        );
    }

    #[test]
    fn test_non_object_input_is_wrapped() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Ok(Schema::of_type("string")));

        let err = transformer(resolver)
            .transform_mutation("createWidget", &create_widget())
            .unwrap_err();

        match err {
            YarpcError::Operation {
                operation_id,
                phase,
                source,
            } => {
                assert_eq!(operation_id, "createWidget");
                assert_eq!(phase, Phase::Input);
                assert!(matches!(*source, YarpcError::NotObjectSchema));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_boolean_input_schema_is_rejected() {
        let mut resolver = MockResolver::new();
        resolver.expect_resolve().never();

        let operation = OperationDef {
            input: Some(InputDef::new(SchemaOrRef::Boolean(true))),
            ..Default::default()
        };
        let err = transformer(resolver)
            .transform_mutation("anything", &operation)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to transform input for operation \"anything\""
        );
        assert_eq!(
            err.source().unwrap().to_string(),
            "input schema must be an object type"
        );
    }

    #[test]
    fn test_passthrough_fields_are_kept_but_never_shadow_computed_ones() {
        let mut operation = OperationDef {
            extras: OperationExtras {
                summary: Some("Check health".to_string()),
                tags: Some(vec!["ops".to_string()]),
                deprecated: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        operation
            .extras
            .extensions
            .insert("operationId".to_string(), json!("hijacked"));
        operation
            .extras
            .extensions
            .insert("x-rate-limit".to_string(), json!(10));

        let actual = transformer(MockResolver::new())
            .transform_query("health", &operation)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&actual).unwrap(),
            json!({
                "operationId": "health",
                "responses": { "200": { "description": "OK" } },
                "summary": "Check health",
                "tags": ["ops"],
                "deprecated": true,
                "x-rate-limit": 10
            })
        );
    }

    #[test]
    fn test_emits_debug_trace_per_operation() {
        let mut logger = MockSink::new();
        logger
            .expect_debug()
            .withf(|_, message| message == "Transforming operation \"health\"")
            .times(1)
            .return_const(());
        logger.expect_warn().never();

        let actual = transformer(MockResolver::new())
            .with_logger(Arc::new(logger))
            .transform_query("health", &OperationDef::default());

        assert!(actual.is_ok());
    }
}
