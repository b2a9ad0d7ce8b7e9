//! `SqliteDatabase` is the concrete SQLite implementation of the engine's storage traits.
use std::fmt::Debug;

use sqlx::SqlitePool;

use super::db::{db_url, new_pool, users};
use crate::{
    db_types::{AccountStatus, NewUserAccount, StoredPassword, UserAccount},
    traits::{UserManagement, UserStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database given by the `PENDU_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, UserStoreError> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, UserStoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl UserManagement for SqliteDatabase {
    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_email(email, &mut conn).await
    }

    async fn fetch_user_by_id(
        &self,
        id: i64,
        status: Option<AccountStatus>,
    ) -> Result<Option<UserAccount>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_id(id, status, &mut conn).await
    }

    async fn fetch_users(&self) -> Result<Vec<UserAccount>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_users(&mut conn).await
    }

    async fn fetch_users_by_status(&self, status: AccountStatus) -> Result<Vec<UserAccount>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_users_by_status(status, &mut conn).await
    }

    async fn insert_user(&self, user: NewUserAccount) -> Result<UserAccount, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(user, &mut conn).await
    }

    async fn update_password(&self, email: &str, password: StoredPassword) -> Result<(), UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::update_password(email, &password, &mut conn).await
    }

    async fn update_status(
        &self,
        id: i64,
        from: AccountStatus,
        to: AccountStatus,
    ) -> Result<u64, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::update_status(id, from, to, &mut conn).await
    }

    async fn soft_delete_user(&self, id: i64, only_pending: bool) -> Result<u64, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::soft_delete_user(id, only_pending, &mut conn).await
    }

    async fn touch_last_login(&self, email: &str) -> Result<(), UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::touch_last_login(email, &mut conn).await
    }

    async fn clear_push_token(&self, token: &str) -> Result<u64, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::clear_push_token(token, &mut conn).await
    }

    async fn set_push_token(&self, email: &str, token: &str) -> Result<(), UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        users::set_push_token(email, token, &mut conn).await
    }
}
