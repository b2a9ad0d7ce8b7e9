//! Storage interface contracts for the Pendu engine.
//!
//! The engine is backend-agnostic: everything it knows about persistence is expressed by the [`UserManagement`]
//! trait. The SQLite backend in [`crate::sqlite`] is the production implementation; tests substitute mocks.
//!
//! All default reads exclude soft-deleted rows (rows with a non-null `deleted_at`). Every write is a
//! single-statement atomic operation; no multi-step transactions are required by the engine.
mod user_management;

pub use user_management::{UserManagement, UserStoreError};
