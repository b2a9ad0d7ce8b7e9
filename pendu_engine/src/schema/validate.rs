use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{check_unknown_params, filter_against_schema, resolver::SchemaResolver, SchemaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Body,
    Query,
    Path,
    Header,
}

/// One declared parameter of an operation. Only `body` parameters carry a schema; the other locations are
/// listed for completeness and ignored by body validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Option<Value>,
}

/// The declared parameter list of a single route+method pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationSpec {
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl OperationSpec {
    pub fn new(parameters: Vec<ParameterSpec>) -> Self {
        Self { parameters }
    }

    fn body_parameter(&self) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.location == ParameterLocation::Body)
    }
}

/// Validates (and normalizes) a request body against an operation's declared body parameter.
///
/// Operations that declare no body parameter have their body reset to an empty object, so undeclared payloads
/// can never leak past validation. For operations with a body parameter, the schema is resolved through the
/// definitions cache, the body is projected onto it and every surplus path is collected before the top-level
/// required keys are checked. On success the body is replaced by its projection, i.e. handlers only ever see
/// declared fields.
pub fn validate_request_body(
    body: &mut Value,
    operation: &OperationSpec,
    resolver: &SchemaResolver,
) -> Result<(), SchemaError> {
    let Some(parameter) = operation.body_parameter() else {
        *body = Value::Object(serde_json::Map::new());
        return Ok(());
    };
    let schema = match &parameter.schema {
        Some(schema) => resolver.resolve_schema(schema)?,
        None => {
            *body = Value::Object(serde_json::Map::new());
            return Ok(());
        },
    };
    let filtered = filter_against_schema(body, &schema);
    let unknown = check_unknown_params(body, &filtered);
    if !unknown.is_empty() {
        return Err(SchemaError::UnknownParameters(unknown));
    }
    let missing = check_required_params(&filtered, &schema);
    if !missing.is_empty() {
        return Err(SchemaError::MissingParameters(missing));
    }
    *body = filtered;
    Ok(())
}

/// Reports the schema's top-level `required` keys that the body does not carry.
///
/// Unlike the unknown-parameter walk this check is deliberately shallow: nested objects are not descended
/// into, so only names listed in the root `required` array can come back.
pub fn check_required_params(body: &Value, schema: &Value) -> Vec<String> {
    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return Vec::new();
    };
    required
        .iter()
        .filter_map(Value::as_str)
        .filter(|name| body.get(name).is_none())
        .map(String::from)
        .collect()
}
