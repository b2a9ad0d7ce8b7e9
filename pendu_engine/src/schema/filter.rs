use serde_json::{Map, Value};

/// Projects a request body onto the keys a schema declares.
///
/// Only keys listed under the schema's `properties` survive; declared keys recurse with their own property
/// schemas, and array values recurse element-wise through the schema's `items`. Bodies (or sub-trees) that the
/// schema does not describe as objects pass through unchanged, so the projection is lenient where the schema is
/// silent.
pub fn filter_against_schema(body: &Value, schema: &Value) -> Value {
    match (body, schema.get("properties")) {
        (Value::Object(fields), Some(Value::Object(properties))) => {
            let mut kept = Map::new();
            for (key, value) in fields {
                if let Some(property) = properties.get(key) {
                    kept.insert(key.clone(), filter_value(value, property));
                }
            }
            Value::Object(kept)
        },
        _ => body.clone(),
    }
}

fn filter_value(value: &Value, schema: &Value) -> Value {
    match value {
        Value::Object(_) => filter_against_schema(value, schema),
        Value::Array(elements) => match schema.get("items") {
            Some(items) => Value::Array(elements.iter().map(|e| filter_value(e, items)).collect()),
            None => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Reports every path present in `body` but absent from its schema projection.
///
/// Paths use dotted notation for object members and bracketed indices for array elements, e.g. `b.d` or
/// `items[2].name`. The walk is fully recursive, descending into nested objects and into array elements that
/// are non-empty objects.
pub fn check_unknown_params(body: &Value, filtered: &Value) -> Vec<String> {
    let mut unknown = Vec::new();
    collect_unknown(body, filtered, "", &mut unknown);
    unknown
}

fn collect_unknown(body: &Value, filtered: &Value, prefix: &str, unknown: &mut Vec<String>) {
    match body {
        Value::Object(fields) => {
            for (key, value) in fields {
                let path =
                    if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
                match filtered.get(key) {
                    None => unknown.push(path),
                    Some(kept) => collect_unknown(value, kept, &path, unknown),
                }
            }
        },
        Value::Array(elements) => {
            for (index, element) in elements.iter().enumerate() {
                let is_nonempty_object = element.as_object().map(|o| !o.is_empty()).unwrap_or(false);
                if is_nonempty_object {
                    let path = format!("{prefix}[{index}]");
                    let kept = filtered.get(index).unwrap_or(&Value::Null);
                    collect_unknown(element, kept, &path, unknown);
                }
            }
        },
        _ => {},
    }
}
