//! Credential checking and token lifecycle.

use std::fmt::Debug;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    api::errors::AuthApiError,
    db_types::{AccountStatus, PublicUserAccount, Role},
    helpers::{hash_password, is_valid_email, verify_password, HashParams},
    tokens::{JwtClaims, TokenIssuer},
    traits::UserManagement,
};

const MIN_PASSWORD_LENGTH: usize = 4;

/// What a successful login hands back: the account (password stripped) and a freshly signed access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub user: PublicUserAccount,
    pub token: String,
}

/// The `AuthApi` owns every decision about who a caller is.
///
/// It never makes authorization decisions; those belong to
/// [`PermissionPolicy`](crate::permissions::PermissionPolicy) once the identity is established.
pub struct AuthApi<B> {
    db: B,
    issuer: TokenIssuer,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    pub fn new(db: B, issuer: TokenIssuer) -> Self {
        Self { db, issuer }
    }

    /// Checks a login/password pair and issues an access token.
    ///
    /// The checks short-circuit in a fixed order: presence of the login, email shape, account existence,
    /// account status, usability of the stored password record, and finally the hash comparison. Each failure
    /// carries the message the client contract expects, so the order is load-bearing. On success the login
    /// timestamp is recorded before the result is returned.
    pub async fn login(&self, login: Option<&str>, password: Option<&str>) -> Result<LoginResult, AuthApiError> {
        let login = login.ok_or_else(|| AuthApiError::wrong_credential("Login is missing"))?;
        if !is_valid_email(login) {
            return Err(AuthApiError::wrong_credential("Wrong credentials"));
        }
        let user = self
            .db
            .fetch_user_by_email(login)
            .await?
            .ok_or_else(|| AuthApiError::wrong_credential("Non existant credential"))?;
        if user.status != AccountStatus::Valid {
            return Err(AuthApiError::wrong_credential("account must be validated."));
        }
        if !user.password.is_complete() {
            return Err(AuthApiError::wrong_credential("Invalid password format"));
        }
        let matches = verify_password(password.unwrap_or_default(), &user.password)
            .map_err(|_| AuthApiError::wrong_credential("Invalid password format"))?;
        if !matches {
            return Err(AuthApiError::wrong_credential("Wrong credentials"));
        }
        let token = self.issuer.issue(&user.email_address, user.role)?;
        self.db.touch_last_login(&user.email_address).await?;
        debug!("Issued access token for {}", user.email_address);
        Ok(LoginResult { user: user.into_public(), token })
    }

    /// Replaces the caller's password record with a freshly derived one.
    ///
    /// The account must exist before the new password is inspected; existence is checked first, length and
    /// confirmation afterwards, and nothing is written until every check has passed.
    pub async fn change_password(
        &self,
        token: Option<&str>,
        password1: Option<&str>,
        password2: Option<&str>,
    ) -> Result<PublicUserAccount, AuthApiError> {
        let (token, password1, password2) = match (token, password1, password2) {
            (Some(t), Some(p1), Some(p2)) if !t.is_empty() && !p1.is_empty() && !p2.is_empty() => (t, p1, p2),
            _ => return Err(AuthApiError::wrong_credential("Missing information for change password")),
        };
        let claims = self
            .issuer
            .decode(token)
            .map_err(|_| AuthApiError::jwt_validation("Invalid JWT user id"))?;
        let user = self
            .db
            .fetch_user_by_email(&claims.email_address)
            .await?
            .ok_or_else(|| AuthApiError::wrong_credential("Non existant credential"))?;
        if password1.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthApiError::wrong_credential("Password is too short"));
        }
        if password1 != password2 {
            return Err(AuthApiError::wrong_credential("Passwords are differents"));
        }
        let fresh = hash_password(password1, HashParams::default())
            .map_err(|_| AuthApiError::wrong_credential("Invalid password format"))?;
        self.db.update_password(&user.email_address, fresh).await?;
        let refreshed = self
            .db
            .fetch_user_by_email(&user.email_address)
            .await?
            .ok_or_else(|| AuthApiError::wrong_credential("Non existant credential"))?;
        Ok(refreshed.into_public())
    }

    /// Signs a token for an already-authenticated identity.
    pub fn create_token(&self, email_address: &str, role: Role) -> Result<String, AuthApiError> {
        self.issuer.issue(email_address, role)
    }

    /// Verifies a token's signature and expiry and returns its claims.
    pub fn decode_token(&self, token: &str) -> Result<JwtClaims, AuthApiError> {
        self.issuer.decode(token)
    }

    /// Boolean token check for the verification endpoint.
    pub fn verify_token(&self, token: &str) -> bool {
        self.issuer.verify(token)
    }
}
