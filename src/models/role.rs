// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Roles and the capabilities each one grants.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A permitted action, embedded in access tokens as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AppCreate,
    AppUpdate,
    AppDelete,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::AppCreate => "app:create",
            Capability::AppUpdate => "app:update",
            Capability::AppDelete => "app:delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User role. The set is closed; an unvalidated role string never gets past
/// [`Role::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access.
    Admin,
    /// Create and update.
    Moderator,
    /// Create only.
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Moderator, Role::User];

    /// Capabilities granted to this role, in a fixed order.
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::AppCreate,
                Capability::AppUpdate,
                Capability::AppDelete,
            ],
            Role::Moderator => &[Capability::AppCreate, Capability::AppUpdate],
            Role::User => &[Capability::AppCreate],
        }
    }

    /// Capabilities as the strings carried in token claims.
    pub fn credentials(&self) -> Vec<String> {
        self.capabilities()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    /// Accepts the canonical names plus `standard-user` for [`Role::User`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "user" | "standard-user" => Ok(Role::User),
            _ => Err(AppError::UnknownRole(s.to_string())),
        }
    }
}

/// Resolve a role name to its credential strings.
pub fn resolve(role: &str) -> Result<Vec<String>, AppError> {
    Ok(role.parse::<Role>()?.credentials())
}
