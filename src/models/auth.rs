// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request payloads for the auth endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUp {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 255))]
    pub password: String,
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(length(min = 1, max = 25))]
    pub user_role: String,
}

/// Log in with email and password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignIn {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

/// Renewal body; the access token travels in the Authorization header.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Renew {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}
