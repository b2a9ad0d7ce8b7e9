use std::collections::HashMap;

use serde_json::{Map, Value};

use super::SchemaError;

/// Resolves `$ref` markers against the document's root `definitions` map.
///
/// All definitions are inlined eagerly at construction into a cache keyed by definition name, so
/// [`resolve_ref`](Self::resolve_ref) is a pure lookup afterwards and resolution is trivially idempotent.
/// The resolver never mutates the definitions it was built from.
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    definitions: Map<String, Value>,
    cache: HashMap<String, Value>,
}

impl SchemaResolver {
    /// Builds a resolver over the given `definitions` map, inlining every nested `$ref` depth-first through
    /// object `properties` and array `items`. Fails if a reference points at a missing definition or if the
    /// definitions refer to each other in a cycle.
    pub fn new(definitions: Map<String, Value>) -> Result<Self, SchemaError> {
        let mut cache = HashMap::with_capacity(definitions.len());
        let names = definitions.keys().cloned().collect::<Vec<_>>();
        let resolver = Self { definitions, cache: HashMap::new() };
        for name in names {
            let mut stack = Vec::new();
            let inlined = resolver.build(&name, &mut stack)?;
            cache.insert(name, inlined);
        }
        Ok(Self { definitions: resolver.definitions, cache })
    }

    /// Resolves a reference of the shape `#/definitions/<Name>` to its fully inlined definition.
    pub fn resolve_ref(&self, reference: &str) -> Result<Value, SchemaError> {
        let name = self.parse_ref(reference)?;
        self.cache.get(name).cloned().ok_or_else(|| SchemaError::DefinitionNotFound(name.to_string()))
    }

    /// Resolves the schema attached to a parameter: a `$ref` node goes through the cache, anything else is
    /// used as-is.
    pub fn resolve_schema(&self, schema: &Value) -> Result<Value, SchemaError> {
        match schema.get("$ref").and_then(Value::as_str) {
            Some(reference) => self.resolve_ref(reference),
            None => Ok(schema.clone()),
        }
    }

    fn parse_ref<'a>(&self, reference: &'a str) -> Result<&'a str, SchemaError> {
        if reference.is_empty() {
            return Err(SchemaError::ReferenceUndefined);
        }
        let segments = reference.split('/').collect::<Vec<_>>();
        if !reference.starts_with('#') || segments.len() < 2 {
            return Err(SchemaError::ReferenceInvalid);
        }
        if self.definitions.is_empty() {
            return Err(SchemaError::DefinitionsMissing);
        }
        // Only the final segment selects the definition; intermediate segments are not walked.
        Ok(segments[segments.len() - 1])
    }

    fn build(&self, name: &str, stack: &mut Vec<String>) -> Result<Value, SchemaError> {
        if stack.iter().any(|n| n == name) {
            return Err(SchemaError::CircularReference(name.to_string()));
        }
        let definition =
            self.definitions.get(name).ok_or_else(|| SchemaError::DefinitionNotFound(name.to_string()))?;
        stack.push(name.to_string());
        let inlined = self.inline_node(definition.clone(), stack)?;
        stack.pop();
        Ok(inlined)
    }

    fn inline_node(&self, node: Value, stack: &mut Vec<String>) -> Result<Value, SchemaError> {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            let name = self.parse_ref(reference)?.to_string();
            return self.build(&name, stack);
        }
        let Value::Object(mut fields) = node else {
            return Ok(node);
        };
        if let Some(Value::Object(properties)) = fields.get_mut("properties") {
            let keys = properties.keys().cloned().collect::<Vec<_>>();
            for key in keys {
                let child = properties.remove(&key).unwrap_or(Value::Null);
                properties.insert(key, self.inline_node(child, stack)?);
            }
        }
        if let Some(items) = fields.remove("items") {
            fields.insert("items".to_string(), self.inline_node(items, stack)?);
        }
        Ok(Value::Object(fields))
    }
}
