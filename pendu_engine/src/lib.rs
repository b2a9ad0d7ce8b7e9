//! Pendu engine
//!
//! The engine is the storage-agnostic core of the Pendu backend. It owns:
//! 1. Request-body validation against the API schema document ([`mod@schema`]). Operations declare their
//!    parameters once; the engine resolves `$ref`s, projects bodies onto the declared shape and reports every
//!    surplus or missing field.
//! 2. Authentication and account management ([`AuthApi`] and [`UsersApi`]). Passwords are PBKDF2 records,
//!    access tokens are HS256 JWTs and authorization is a static role to permission mapping
//!    ([`mod@permissions`]).
//! 3. Database management ([`mod@sqlite`]). SQLite is the only supported backend; any store implementing the
//!    [`traits::UserManagement`] trait can stand in for it, which is what the server's endpoint tests do.
//!
//! All reads honour soft deletion: a deleted account is invisible to every query in the engine.

mod api;
pub mod db_types;
pub mod helpers;
pub mod permissions;
pub mod schema;
mod sqlite;
pub mod tokens;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{errors::AuthApiError, AuthApi, LoginResult, RegisterAccount, UsersApi};
pub use sqlite::{db, SqliteDatabase};
