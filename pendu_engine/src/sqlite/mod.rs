//! SQLite backend for the user store.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
