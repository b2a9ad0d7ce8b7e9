use thiserror::Error;

use crate::db_types::{AccountStatus, NewUserAccount, StoredPassword, UserAccount};

#[derive(Debug, Clone, Error)]
pub enum UserStoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("An account with this email address already exists")]
    DuplicateEmail,
    #[error("Stored record could not be decoded: {0}")]
    MalformedRecord(String),
}

impl From<sqlx::Error> for UserStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// The `UserManagement` trait defines the behaviour a storage backend must expose for the engine's account,
/// authentication and registration flows.
///
/// Semantics that implementations must honour:
/// * Reads never return soft-deleted accounts.
/// * [`insert_user`](Self::insert_user) creates the account as `Pending` / `SimpleUser` and fails with
///   [`UserStoreError::DuplicateEmail`] when a non-deleted account already holds the email address.
/// * [`update_status`](Self::update_status) and [`soft_delete_user`](Self::soft_delete_user) return the number of
///   rows affected, so callers can distinguish "no such pending registration" from success.
/// * The push-token pair ([`clear_push_token`](Self::clear_push_token) then
///   [`set_push_token`](Self::set_push_token)) keeps the token globally unique. Each call is atomic on its own;
///   the two-step sequence is tolerant of lost updates under races (last writer wins).
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Fetches the non-deleted account for the given email address, if any.
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserStoreError>;

    /// Fetches the non-deleted account with the given id, optionally restricted to a status.
    async fn fetch_user_by_id(
        &self,
        id: i64,
        status: Option<AccountStatus>,
    ) -> Result<Option<UserAccount>, UserStoreError>;

    /// Fetches all non-deleted accounts.
    async fn fetch_users(&self) -> Result<Vec<UserAccount>, UserStoreError>;

    /// Fetches all non-deleted accounts with the given status.
    async fn fetch_users_by_status(&self, status: AccountStatus) -> Result<Vec<UserAccount>, UserStoreError>;

    /// Inserts a new pending account and returns the stored record.
    async fn insert_user(&self, user: NewUserAccount) -> Result<UserAccount, UserStoreError>;

    /// Replaces the password record wholesale for the account with the given email address.
    async fn update_password(&self, email: &str, password: StoredPassword) -> Result<(), UserStoreError>;

    /// Moves the account with the given id from `from` to `to` status. Returns the number of rows affected.
    async fn update_status(
        &self,
        id: i64,
        from: AccountStatus,
        to: AccountStatus,
    ) -> Result<u64, UserStoreError>;

    /// Soft-deletes the account with the given id. When `only_pending` is set, the delete only applies to
    /// pending registrations. Returns the number of rows affected.
    async fn soft_delete_user(&self, id: i64, only_pending: bool) -> Result<u64, UserStoreError>;

    /// Records a successful login timestamp for the account.
    async fn touch_last_login(&self, email: &str) -> Result<(), UserStoreError>;

    /// Clears the given push token from every account currently holding it. Returns the number of rows affected.
    async fn clear_push_token(&self, token: &str) -> Result<u64, UserStoreError>;

    /// Assigns the push token to the account with the given email address.
    async fn set_push_token(&self, email: &str, token: &str) -> Result<(), UserStoreError>;
}
