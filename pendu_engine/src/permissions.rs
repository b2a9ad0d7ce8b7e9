//! Role-based permission enforcement.
//!
//! Permissions are a fixed enumeration of capabilities and the role→permission mapping is an immutable value
//! built once at boot and injected wherever enforcement happens. Holding a valid token only authenticates a
//! caller; each operation still checks the claimed role against its required permissions here.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{api::errors::AuthApiError, db_types::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    GetUsers,
    SetOwnToken,
    DeleteOwnToken,
    GetRegisters,
    ValidateRegister,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::GetUsers,
        Permission::SetOwnToken,
        Permission::DeleteOwnToken,
        Permission::GetRegisters,
        Permission::ValidateRegister,
    ];
}

/// The static role→permission mapping.
///
/// Fixed at construction and never mutated afterwards; tests can substitute their own mapping through
/// [`PermissionPolicy::with_grants`].
#[derive(Debug, Clone)]
pub struct PermissionPolicy {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        let mut grants = HashMap::new();
        grants.insert(Role::Administrator, Permission::ALL.into_iter().collect());
        grants.insert(
            Role::SimpleUser,
            [Permission::SetOwnToken, Permission::DeleteOwnToken, Permission::GetUsers].into_iter().collect(),
        );
        Self { grants }
    }
}

impl PermissionPolicy {
    pub fn with_grants(grants: HashMap<Role, HashSet<Permission>>) -> Self {
        Self { grants }
    }

    /// Checks that the identified caller holds **all** of the required permissions.
    ///
    /// An unusable identity (empty email address or a role without an entry in the mapping) fails as a
    /// credential problem; an authenticated caller missing a capability fails as a permission problem. The
    /// check short-circuits on the first missing permission.
    pub fn check(
        &self,
        email_address: &str,
        role: Role,
        required: &[Permission],
    ) -> Result<(), AuthApiError> {
        if email_address.is_empty() {
            return Err(AuthApiError::wrong_credential("Invalid user permission"));
        }
        let held = self
            .grants
            .get(&role)
            .ok_or_else(|| AuthApiError::wrong_credential("Invalid user permission"))?;
        for permission in required {
            if !held.contains(permission) {
                return Err(AuthApiError::wrong_permission("Insufficient permissions"));
            }
        }
        Ok(())
    }
}
