//! Account registration and user management.

use std::fmt::Debug;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    api::errors::AuthApiError,
    db_types::{AccountStatus, NewUserAccount, PublicUserAccount},
    helpers::{hash_password, is_valid_email, HashParams},
    traits::{UserManagement, UserStoreError},
};

const MIN_PASSWORD_LENGTH: usize = 4;

/// A self-registration request. Every field arrives from the client, so each one is optional until it has been
/// checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterAccount {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password1: Option<String>,
    pub password2: Option<String>,
}

/// User and registration management on top of a [`UserManagement`] backend.
pub struct UsersApi<B> {
    db: B,
}

impl<B: Debug> Debug for UsersApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UsersApi ({:?})", self.db)
    }
}

impl<B> UsersApi<B>
where B: UserManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Creates a new pending account from a self-registration request.
    ///
    /// Validation order is fixed: email presence, email shape, password length, email uniqueness, password
    /// confirmation. The account is stored as `Pending`/`SimpleUser` and stays invisible to login until an
    /// administrator approves it.
    pub async fn register(&self, request: RegisterAccount) -> Result<PublicUserAccount, AuthApiError> {
        let email_address = match request.email_address {
            Some(e) if !e.is_empty() => e,
            _ => return Err(AuthApiError::wrong_credential("Email address is missing")),
        };
        if !is_valid_email(&email_address) {
            return Err(AuthApiError::wrong_credential("Email address incorrect format"));
        }
        let password1 = request.password1.unwrap_or_default();
        if password1.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthApiError::wrong_credential("Password is too short"));
        }
        if self.db.fetch_user_by_email(&email_address).await?.is_some() {
            return Err(AuthApiError::wrong_credential("User already exist"));
        }
        if Some(&password1) != request.password2.as_ref() {
            return Err(AuthApiError::wrong_credential("Passwords are differents"));
        }
        let password = hash_password(&password1, HashParams::default())
            .map_err(|_| AuthApiError::wrong_credential("Invalid password format"))?;
        let new_user = NewUserAccount {
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            email_address,
            password,
        };
        match self.db.insert_user(new_user).await {
            Ok(user) => {
                info!("New registration pending approval: {}", user.email_address);
                Ok(user.into_public())
            },
            Err(UserStoreError::DuplicateEmail) => Err(AuthApiError::wrong_credential("User already exist")),
            Err(e) => Err(e.into()),
        }
    }

    /// All registrations still waiting for approval.
    pub async fn pending_registrations(&self) -> Result<Vec<PublicUserAccount>, AuthApiError> {
        let pending = self.db.fetch_users_by_status(AccountStatus::Pending).await?;
        if pending.is_empty() {
            return Err(AuthApiError::not_found("There is no pending register"));
        }
        Ok(pending.into_iter().map(|u| u.into_public()).collect())
    }

    /// A single pending registration by account id.
    pub async fn pending_registration(&self, id: i64) -> Result<PublicUserAccount, AuthApiError> {
        self.db
            .fetch_user_by_id(id, Some(AccountStatus::Pending))
            .await?
            .map(|u| u.into_public())
            .ok_or_else(|| AuthApiError::not_found("Non existing register"))
    }

    /// Moves a pending registration to `Valid`, unlocking login for the account.
    pub async fn approve_registration(&self, id: i64) -> Result<(), AuthApiError> {
        let updated = self.db.update_status(id, AccountStatus::Pending, AccountStatus::Valid).await?;
        if updated == 0 {
            return Err(AuthApiError::not_found("Non existing register"));
        }
        info!("Registration {id} approved");
        Ok(())
    }

    /// Soft-deletes a pending registration. Approved accounts are not touched by this path.
    pub async fn reject_registration(&self, id: i64) -> Result<(), AuthApiError> {
        let deleted = self.db.soft_delete_user(id, true).await?;
        if deleted == 0 {
            return Err(AuthApiError::not_found("Non existing register"));
        }
        info!("Registration {id} rejected");
        Ok(())
    }

    /// Attaches a push token to the caller's account.
    ///
    /// A token may only ever belong to one account, so it is first cleared from every current holder and then
    /// assigned. Reinstalling the app on a shared device therefore silently steals the token from the previous
    /// account.
    pub async fn set_push_token(&self, email: &str, token: &str) -> Result<(), AuthApiError> {
        if !has_push_token_shape(token) {
            return Err(AuthApiError::wrong_credential("Invalid push token"));
        }
        let user = self
            .db
            .fetch_user_by_email(email)
            .await?
            .ok_or_else(|| AuthApiError::wrong_credential("Invalid JWT user id"))?;
        let cleared = self.db.clear_push_token(token).await?;
        if cleared > 0 {
            debug!("Push token reassigned away from {cleared} account(s)");
        }
        self.db.set_push_token(&user.email_address, token).await?;
        Ok(())
    }

    /// Detaches the caller's push token. An account without a token is a no-op, not an error.
    pub async fn remove_push_token(&self, email: &str) -> Result<(), AuthApiError> {
        let user = self
            .db
            .fetch_user_by_email(email)
            .await?
            .ok_or_else(|| AuthApiError::wrong_credential("Invalid JWT user id"))?;
        if let Some(token) = user.push_token {
            self.db.clear_push_token(&token).await?;
        }
        Ok(())
    }

    /// A single account by id, password stripped.
    pub async fn user_by_id(&self, id: i64) -> Result<PublicUserAccount, AuthApiError> {
        self.db
            .fetch_user_by_id(id, None)
            .await?
            .map(|u| u.into_public())
            .ok_or_else(|| AuthApiError::not_found("Non existing user"))
    }

    /// A single account by email address, password stripped.
    pub async fn user_by_email(&self, email: &str) -> Result<PublicUserAccount, AuthApiError> {
        self.db
            .fetch_user_by_email(email)
            .await?
            .map(|u| u.into_public())
            .ok_or_else(|| AuthApiError::not_found("Non existing user"))
    }

    /// Every non-deleted account, passwords stripped.
    pub async fn users(&self) -> Result<Vec<PublicUserAccount>, AuthApiError> {
        let users = self.db.fetch_users().await?;
        Ok(users.into_iter().map(|u| u.into_public()).collect())
    }
}

// Opaque device tokens are three dot-separated non-empty segments.
fn has_push_token_shape(token: &str) -> bool {
    let segments = token.split('.').collect::<Vec<_>>();
    segments.len() == 3 && segments.iter().all(|s| !s.is_empty())
}
