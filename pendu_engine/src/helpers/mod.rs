//! Pure helper functions with no storage dependencies.
mod emails;
mod passwords;

pub use emails::is_valid_email;
pub use passwords::{hash_password, verify_password, HashParams, PasswordHashError, DEFAULT_ITERATIONS};
