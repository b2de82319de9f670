// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use super::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account status. Stored but not enforced.
pub const USER_STATUS_BLOCKED: i32 = 0;
pub const USER_STATUS_ACTIVE: i32 = 1;

/// User record as held by the user repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// RFC 3339
    pub created_at: String,
    pub updated_at: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub user_status: i32,
    pub user_role: Role,
}

/// User as returned to API callers (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_status: i32,
    pub user_role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            user_status: user.user_status,
            user_role: user.user_role,
        }
    }
}
