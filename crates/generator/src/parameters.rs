//! Splits an operation's input schema into parameters and a request body

use indexmap::IndexMap;
use yarpc_common::{
    InputLocation, Parameter, ParameterLocation, ParameterOverride, RequestBody, Result, Schema,
    SchemaOrRef, SchemaType, YarpcError,
};

/// Override keys that never reach the generated parameter
const RESERVED_PARAMETER_KEYS: [&str; 2] = ["name", "schema"];

/// Parameters and request body derived from an input schema
///
/// `None` means the operation gets no such key at all, which is different
/// from an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitInput {
    pub parameters: Option<Vec<Parameter>>,
    pub request_body: Option<RequestBody>,
}

/// A property that stays in the request body
struct BodyField<'a> {
    name: &'a str,
    schema: &'a SchemaOrRef,
    required: bool,
}

/// Partition the properties of an object input schema
///
/// `schema_or_ref` is the schema as written in the operation and
/// `input_schema` its resolved form. Each property goes to the location named
/// by its override, or `default_location` otherwise.
///
/// # Example
/// ```rust,ignore
/// // CreateWidgetInput { userId (required), status (required) }
/// let overrides = IndexMap::from([
///     ("userId".to_string(), ParameterOverride::located(InputLocation::Path)),
/// ]);
/// let split = split_input(&schema_ref, &resolved, InputLocation::Body, &overrides)?;
/// // split.parameters   == [{ name: userId, in: path, required: true, schema: ... }]
/// // split.request_body == { required: true, content: { application/json:
/// //     { schema: { type: object, properties: { status }, required: [status] } } } }
/// ```
pub fn split_input(
    schema_or_ref: &SchemaOrRef,
    input_schema: &Schema,
    default_location: InputLocation,
    overrides: &IndexMap<String, ParameterOverride>,
) -> Result<SplitInput> {
    if !input_schema.is_object() {
        return Err(YarpcError::NotObjectSchema);
    }
    let properties = input_schema
        .properties
        .as_ref()
        .ok_or(YarpcError::MissingProperties)?;

    // Whole input is the body: keep the schema (or its $ref) as written
    if overrides.is_empty() && default_location == InputLocation::Body {
        return Ok(SplitInput {
            parameters: None,
            request_body: Some(RequestBody::json(schema_or_ref.clone())),
        });
    }

    let mut parameters = Vec::new();
    let mut body_fields = Vec::new();

    for (name, schema) in properties {
        let field_override = overrides.get(name);
        let location = field_override
            .and_then(|o| o.location)
            .unwrap_or(default_location);
        let required = input_schema.is_required(name);

        match location.parameter_location() {
            Some(location) => parameters.push(build_parameter(
                name,
                location,
                schema,
                required,
                field_override,
            )),
            None => body_fields.push(BodyField {
                name,
                schema,
                required,
            }),
        }
    }

    Ok(SplitInput {
        parameters: (!parameters.is_empty()).then_some(parameters),
        request_body: (!body_fields.is_empty())
            .then(|| RequestBody::json(SchemaOrRef::Inline(body_schema(body_fields)))),
    })
}

/// Parameter for one field, with override attributes taking precedence
fn build_parameter(
    name: &str,
    location: ParameterLocation,
    schema: &SchemaOrRef,
    required: bool,
    field_override: Option<&ParameterOverride>,
) -> Parameter {
    let over = field_override.cloned().unwrap_or_default();

    Parameter {
        name: name.to_string(),
        location,
        description: over.description,
        required: over.required.or(required.then_some(true)),
        deprecated: over.deprecated,
        allow_empty_value: over.allow_empty_value,
        style: over.style,
        explode: over.explode,
        allow_reserved: over.allow_reserved,
        schema: Some(schema.clone()),
        example: over.example,
        examples: over.examples,
        content: over.content,
        extensions: over
            .extensions
            .into_iter()
            .filter(|(key, _)| !RESERVED_PARAMETER_KEYS.contains(&key.as_str()))
            .collect(),
    }
}

/// Fold the body fields into one object schema
fn body_schema(fields: Vec<BodyField<'_>>) -> Schema {
    let required = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name.to_string())
        .collect();
    let properties = fields
        .into_iter()
        .map(|field| (field.name.to_string(), field.schema.clone()))
        .collect();

    Schema {
        schema_type: Some(SchemaType::Single("object".to_string())),
        properties: Some(properties),
        required: Some(required),
        keywords: IndexMap::new(),
    }
}
