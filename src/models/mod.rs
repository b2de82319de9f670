// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod auth;
pub mod role;
pub mod token;
pub mod user;

pub use auth::{Renew, SignIn, SignUp};
pub use role::{Capability, Role};
pub use token::{TokenClaims, TokenKind, TokenPair};
pub use user::{User, UserResponse};
