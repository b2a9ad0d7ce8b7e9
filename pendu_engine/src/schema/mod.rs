//! Declarative request-body validation against an API schema document.
//!
//! The schema document is a read-only tree of `serde_json` values assembled once at boot: definitions keyed by
//! name, plus per-operation parameter lists. Validation is a filter-then-diff: the submitted body is projected
//! onto the keys the schema declares ([`filter_against_schema`]) and every path present in the body but absent
//! from the projection is reported ([`check_unknown_params`]). This deliberately only catches *extra*
//! undeclared fields; *missing* required fields are a separate, shallow top-level check
//! ([`check_required_params`]). The two checks have different recursion depths on purpose.

mod filter;
mod resolver;
mod validate;

use thiserror::Error;

pub use filter::{check_unknown_params, filter_against_schema};
pub use resolver::SchemaResolver;
pub use validate::{
    check_required_params,
    validate_request_body,
    OperationSpec,
    ParameterLocation,
    ParameterSpec,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("The referenced schema is not defined")]
    ReferenceUndefined,
    #[error("The referenced schema path is invalid")]
    ReferenceInvalid,
    #[error("No definition is set in the schema document")]
    DefinitionsMissing,
    #[error("The referenced schema doesn't exist")]
    DefinitionNotFound(String),
    #[error("Circular reference in schema definition {0}")]
    CircularReference(String),
    #[error("Some specified parameters aren't specified in the schema document")]
    UnknownParameters(Vec<String>),
    #[error("Required parameters are missing from the request body")]
    MissingParameters(Vec<String>),
}
