use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use crate::{
    db_types::{AccountStatus, NewUserAccount, Role, StoredPassword, UserAccount},
    traits::UserStoreError,
};

const USER_COLUMNS: &str = "id, first_name, last_name, email_address, role, status, password, push_token, \
                            last_login, created_at, updated_at";

fn user_from_row(row: &SqliteRow) -> Result<UserAccount, UserStoreError> {
    let role = row
        .try_get::<String, _>("role")?
        .parse::<Role>()
        .map_err(|e| UserStoreError::MalformedRecord(e.to_string()))?;
    let status = row
        .try_get::<String, _>("status")?
        .parse::<AccountStatus>()
        .map_err(|e| UserStoreError::MalformedRecord(e.to_string()))?;
    let password = serde_json::from_str::<StoredPassword>(&row.try_get::<String, _>("password")?)
        .map_err(|e| UserStoreError::MalformedRecord(format!("password record: {e}")))?;
    Ok(UserAccount {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email_address: row.try_get("email_address")?,
        role,
        status,
        password,
        push_token: row.try_get("push_token")?,
        last_login: row.try_get::<Option<DateTime<Utc>>, _>("last_login")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn fetch_user_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, UserStoreError> {
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE email_address = ? AND deleted_at IS NULL");
    let row = sqlx::query(&q).bind(email).fetch_optional(conn).await?;
    row.as_ref().map(user_from_row).transpose()
}

pub async fn fetch_user_by_id(
    id: i64,
    status: Option<AccountStatus>,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, UserStoreError> {
    let row = match status {
        Some(status) => {
            let q = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND status = ? AND deleted_at IS NULL"
            );
            sqlx::query(&q).bind(id).bind(status.to_string()).fetch_optional(conn).await?
        },
        None => {
            let q = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL");
            sqlx::query(&q).bind(id).fetch_optional(conn).await?
        },
    };
    row.as_ref().map(user_from_row).transpose()
}

pub async fn fetch_users(conn: &mut SqliteConnection) -> Result<Vec<UserAccount>, UserStoreError> {
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id");
    let rows = sqlx::query(&q).fetch_all(conn).await?;
    rows.iter().map(user_from_row).collect()
}

pub async fn fetch_users_by_status(
    status: AccountStatus,
    conn: &mut SqliteConnection,
) -> Result<Vec<UserAccount>, UserStoreError> {
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE status = ? AND deleted_at IS NULL ORDER BY id");
    let rows = sqlx::query(&q).bind(status.to_string()).fetch_all(conn).await?;
    rows.iter().map(user_from_row).collect()
}

/// Inserts a pending account and returns the stored row. Role and status come from the column defaults
/// (`SimpleUser` / `pending`), never from the caller.
pub async fn insert_user(
    user: NewUserAccount,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, UserStoreError> {
    let password = serde_json::to_string(&user.password)
        .map_err(|e| UserStoreError::MalformedRecord(format!("password record: {e}")))?;
    let result = sqlx::query(
        "INSERT INTO users (first_name, last_name, email_address, password) VALUES (?, ?, ?, ?)",
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email_address)
    .bind(password)
    .execute(&mut *conn)
    .await;
    let result = match result {
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            return Err(UserStoreError::DuplicateEmail)
        },
        other => other?,
    };
    let id = result.last_insert_rowid();
    fetch_user_by_id(id, None, conn)
        .await?
        .ok_or_else(|| UserStoreError::Database(format!("freshly inserted user {id} is missing")))
}

pub async fn update_password(
    email: &str,
    password: &StoredPassword,
    conn: &mut SqliteConnection,
) -> Result<(), UserStoreError> {
    let password = serde_json::to_string(password)
        .map_err(|e| UserStoreError::MalformedRecord(format!("password record: {e}")))?;
    sqlx::query(
        "UPDATE users SET password = ?, updated_at = CURRENT_TIMESTAMP WHERE email_address = ? AND \
         deleted_at IS NULL",
    )
    .bind(password)
    .bind(email)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update_status(
    id: i64,
    from: AccountStatus,
    to: AccountStatus,
    conn: &mut SqliteConnection,
) -> Result<u64, UserStoreError> {
    let result = sqlx::query(
        "UPDATE users SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND status = ? AND \
         deleted_at IS NULL",
    )
    .bind(to.to_string())
    .bind(id)
    .bind(from.to_string())
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete_user(
    id: i64,
    only_pending: bool,
    conn: &mut SqliteConnection,
) -> Result<u64, UserStoreError> {
    let q = if only_pending {
        "UPDATE users SET deleted_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND \
         status = 'pending' AND deleted_at IS NULL"
    } else {
        "UPDATE users SET deleted_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND \
         deleted_at IS NULL"
    };
    let result = sqlx::query(q).bind(id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn touch_last_login(email: &str, conn: &mut SqliteConnection) -> Result<(), UserStoreError> {
    sqlx::query("UPDATE users SET last_login = CURRENT_TIMESTAMP WHERE email_address = ? AND deleted_at IS NULL")
        .bind(email)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn clear_push_token(token: &str, conn: &mut SqliteConnection) -> Result<u64, UserStoreError> {
    let result = sqlx::query(
        "UPDATE users SET push_token = NULL, updated_at = CURRENT_TIMESTAMP WHERE push_token = ? AND \
         deleted_at IS NULL",
    )
    .bind(token)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_push_token(
    email: &str,
    token: &str,
    conn: &mut SqliteConnection,
) -> Result<(), UserStoreError> {
    sqlx::query(
        "UPDATE users SET push_token = ?, updated_at = CURRENT_TIMESTAMP WHERE email_address = ? AND \
         deleted_at IS NULL",
    )
    .bind(token)
    .bind(email)
    .execute(conn)
    .await?;
    Ok(())
}
