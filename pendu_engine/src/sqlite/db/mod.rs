//! Low-level SQLite interactions.
//!
//! Everything in here is a plain function taking a `&mut SqliteConnection`, so callers decide whether a
//! statement runs on a pooled connection or inside a transaction. The [`UserManagement`] trait implementation
//! in [`super::SqliteDatabase`] is a thin shim over these functions.
//!
//! [`UserManagement`]: crate::traits::UserManagement
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod users;

const SQLITE_DB_URL: &str = "sqlite://data/pendu_store.db";

pub fn db_url() -> String {
    let result = env::var("PENDU_DATABASE_URL").unwrap_or_else(|_| {
        info!("PENDU_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqlxError> {
    sqlx::migrate!("./src/sqlite/migrations").run(pool).await.map_err(SqlxError::from)?;
    Ok(())
}
