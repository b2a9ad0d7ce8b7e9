use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------        Role        -----------------------------------------------------------
/// The role attached to a user account. Roles are assigned at registration time (every self-registered account is a
/// [`Role::SimpleUser`]) and map onto a fixed set of permissions via
/// [`PermissionPolicy`](crate::permissions::PermissionPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    SimpleUser,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Administrator => write!(f, "Administrator"),
            Role::SimpleUser => write!(f, "SimpleUser"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrator" => Ok(Self::Administrator),
            "SimpleUser" => Ok(Self::SimpleUser),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------    AccountStatus    ----------------------------------------------------------
/// Lifecycle status of a user account.
///
/// Accounts are created as `Pending` by self-registration and only move to `Valid` through an explicit admin
/// approval. There is no transition back from `Valid` to `Pending`; rejected registrations are soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Valid,
}

impl Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Pending => write!(f, "pending"),
            AccountStatus::Valid => write!(f, "valid"),
        }
    }
}

impl FromStr for AccountStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "valid" => Ok(Self::Valid),
            s => Err(ConversionError(format!("Invalid account status: {s}"))),
        }
    }
}

//--------------------------------------    StoredPassword    ---------------------------------------------------------
/// The full password derivation record for an account, stored as a single JSON document.
///
/// The record is created at registration, replaced wholesale on password change and never partially updated.
/// `hash` is the hex encoding of `PBKDF2-HMAC-<algorithm>(sha256_hex(password), salt, iterations, length)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPassword {
    pub salt: String,
    pub iterations: u32,
    pub algorithm: String,
    pub length: usize,
    pub hash: String,
}

impl StoredPassword {
    /// A record is usable only when every derivation parameter is present and non-trivial. Documents written by
    /// older migrations may miss fields, which surfaces here as an invalid format rather than a hash mismatch.
    pub fn is_complete(&self) -> bool {
        !self.hash.is_empty()
            && !self.salt.is_empty()
            && !self.algorithm.is_empty()
            && self.iterations > 0
            && self.length > 0
    }
}

//--------------------------------------     UserAccount      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub role: Role,
    pub status: AccountStatus,
    pub password: StoredPassword,
    pub push_token: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Strips the password record off the account for anything that leaves the engine.
    pub fn into_public(self) -> PublicUserAccount {
        PublicUserAccount {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email_address: self.email_address,
            role: self.role,
            status: self.status,
            push_token: self.push_token,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A [`UserAccount`] with the password record stripped. This is the only account representation that crosses the
/// API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUserAccount {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub role: Role,
    pub status: AccountStatus,
    pub push_token: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    NewUserAccount    ---------------------------------------------------------
/// The record inserted by self-registration. Status is always `Pending` and role always `SimpleUser` at this point;
/// both are set by the store rather than the caller.
#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: StoredPassword,
}
