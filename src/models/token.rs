// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token claims and the access/refresh pair handed to clients.

use serde::{Deserialize, Serialize};

/// Which secret and lifetime a token was minted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix seconds)
    pub exp: i64,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Unique per token, so two pairs minted in the same second still differ
    pub jti: String,
    pub kind: TokenKind,
    /// Capability strings. Only access tokens carry them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub credentials: Vec<String>,
}

impl TokenClaims {
    /// Access tokens are valid through their expiry second inclusive.
    pub fn access_valid_at(&self, now: i64) -> bool {
        now <= self.exp
    }

    /// Refresh tokens must be strictly before their expiry to renew.
    pub fn refresh_valid_at(&self, now: i64) -> bool {
        now < self.exp
    }
}

/// Access + refresh token pair. Always minted together for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}
