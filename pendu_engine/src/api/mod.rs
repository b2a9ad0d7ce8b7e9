//! The public API surfaces of the engine.
//!
//! The server layer talks to storage exclusively through these two structs; both are generic over the
//! [`UserManagement`](crate::traits::UserManagement) backend so tests can substitute a mock or an in-memory
//! database.

mod auth_api;
pub mod errors;
mod users_api;

pub use auth_api::{AuthApi, LoginResult};
pub use users_api::{RegisterAccount, UsersApi};
