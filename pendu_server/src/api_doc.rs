//! The API document.
//!
//! Definitions and per-operation parameter lists are assembled once at boot and shared with the request
//! validation middleware. Only operations listed here have their bodies validated; routes without an entry
//! carry no body contract.

use std::collections::HashMap;

use actix_web::http::Method;
use pendu_engine::schema::{
    OperationSpec,
    ParameterLocation,
    ParameterSpec,
    SchemaError,
    SchemaResolver,
};
use serde_json::{json, Map, Value};

pub struct ApiDoc {
    resolver: SchemaResolver,
    operations: HashMap<(Method, String), OperationSpec>,
}

impl ApiDoc {
    pub fn new() -> Result<Self, SchemaError> {
        let resolver = SchemaResolver::new(definitions())?;
        let mut operations = HashMap::new();
        operations.insert(
            (Method::POST, "/auth/login".to_string()),
            body_operation("credentials", "#/definitions/Credentials"),
        );
        operations.insert(
            (Method::POST, "/auth/register".to_string()),
            body_operation("registration", "#/definitions/Register"),
        );
        operations.insert(
            (Method::POST, "/auth/newpassword".to_string()),
            body_operation("new password", "#/definitions/NewPassword"),
        );
        operations.insert(
            (Method::PUT, "/users/push-token".to_string()),
            body_operation("push token", "#/definitions/PushToken"),
        );
        operations.insert(
            (Method::GET, "/auth/verifyToken".to_string()),
            OperationSpec::new(vec![ParameterSpec {
                name: "token".to_string(),
                location: ParameterLocation::Query,
                required: true,
                schema: None,
            }]),
        );
        Ok(Self { resolver, operations })
    }

    pub fn operation(&self, method: &Method, path: &str) -> Option<&OperationSpec> {
        self.operations.get(&(method.clone(), path.to_string()))
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }
}

fn body_operation(name: &str, reference: &str) -> OperationSpec {
    OperationSpec::new(vec![ParameterSpec {
        name: name.to_string(),
        location: ParameterLocation::Body,
        required: true,
        schema: Some(json!({ "$ref": reference })),
    }])
}

// Field presence is checked by the handlers so that each missing field gets its specific message; the schema
// document only polices the set of allowed keys.
fn definitions() -> Map<String, Value> {
    let defs = json!({
        "Credentials": {
            "type": "object",
            "properties": {
                "login": { "type": "string" },
                "password": { "type": "string" }
            }
        },
        "Register": {
            "type": "object",
            "properties": {
                "first_name": { "type": "string" },
                "last_name": { "type": "string" },
                "email_address": { "type": "string" },
                "password1": { "type": "string" },
                "password2": { "type": "string" }
            }
        },
        "NewPassword": {
            "type": "object",
            "properties": {
                "token": { "type": "string" },
                "password1": { "type": "string" },
                "password2": { "type": "string" }
            }
        },
        "PushToken": {
            "type": "object",
            "properties": {
                "push_token": { "type": "string" }
            }
        }
    });
    match defs {
        Value::Object(m) => m,
        _ => unreachable!(),
    }
}
