use crate::{sqlite::db::run_migrations, SqliteDatabase};

/// A self-contained in-memory database with the schema applied.
///
/// The pool is capped at a single connection: every connection to `sqlite::memory:` gets its own blank
/// database, so a wider pool would scatter the schema.
pub async fn new_memory_db() -> SqliteDatabase {
    let db = SqliteDatabase::new_with_url("sqlite::memory:", 1)
        .await
        .expect("Error creating in-memory database");
    run_migrations(db.pool()).await.expect("Error running DB migrations");
    db
}
