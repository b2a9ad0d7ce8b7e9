mod acl;
mod jwt;
mod validation;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use jwt::{JwtMiddlewareFactory, JwtMiddlewareService};
pub use validation::{BodyValidationFactory, BodyValidationService};
