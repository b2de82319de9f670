// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token issuance and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with separate keys.
//! [`TokenService::parse`] checks structure, signature and kind but never
//! expiry: renewal has to read the expiry of a token that may already have
//! lapsed, so temporal checks are left to the caller.

use crate::config::Config;
use crate::models::{TokenClaims, TokenKind, TokenPair};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;

/// Longest lifetime either token kind may be configured with (100 years).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Token errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not match")]
    BadSignature,

    #[error("expected {expected:?} token, got {actual:?}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

/// Mints and parses token pairs. Built once at startup from [`Config`].
#[derive(Clone)]
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenService {
    pub fn new(
        access_key: &[u8],
        refresh_key: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, TokenError> {
        if access_key.is_empty() || refresh_key.is_empty() {
            return Err(TokenError::Signing("signing key is empty".to_string()));
        }

        Ok(Self {
            access: KeyPair {
                encoding: EncodingKey::from_secret(access_key),
                decoding: DecodingKey::from_secret(access_key),
                ttl_secs: ttl_secs(access_ttl)?,
            },
            refresh: KeyPair {
                encoding: EncodingKey::from_secret(refresh_key),
                decoding: DecodingKey::from_secret(refresh_key),
                ttl_secs: ttl_secs(refresh_ttl)?,
            },
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TokenError> {
        Self::new(
            &config.access_signing_key,
            &config.refresh_signing_key,
            config.access_ttl,
            config.refresh_ttl,
        )
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access.ttl_secs
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh.ttl_secs
    }

    /// Mint an access/refresh pair for `subject` at time `now`.
    pub fn issue(
        &self,
        subject: &str,
        credentials: Vec<String>,
        now: i64,
    ) -> Result<TokenPair, TokenError> {
        let access = self.sign(subject, TokenKind::Access, credentials, now)?;
        let refresh = self.sign(subject, TokenKind::Refresh, Vec::new(), now)?;
        Ok(TokenPair { access, refresh })
    }

    fn sign(
        &self,
        subject: &str,
        kind: TokenKind,
        credentials: Vec<String>,
        now: i64,
    ) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let exp = now
            .checked_add(keys.ttl_secs)
            .ok_or_else(|| TokenError::Signing(format!("expiry out of range at {}", now)))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            exp,
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
            kind,
            credentials,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and kind and return the claims, expired or not.
    pub fn parse(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<TokenClaims>(token, &self.keys(kind).decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        let claims = token_data.claims;
        if claims.kind != kind {
            return Err(TokenError::WrongKind {
                expected: kind,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }

    /// Issue and parse a throwaway pair. Run at startup so a broken key fails
    /// the process instead of the first sign-in.
    pub fn self_check(&self, now: i64) -> Result<(), TokenError> {
        let pair = self.issue("self-check", vec!["self-check".to_string()], now)?;
        let access = self.parse(&pair.access, TokenKind::Access)?;
        let refresh = self.parse(&pair.refresh, TokenKind::Refresh)?;
        if access.sub != "self-check" || refresh.sub != "self-check" {
            return Err(TokenError::Signing("self-check token did not round-trip".to_string()));
        }
        Ok(())
    }
}

fn ttl_secs(ttl: Duration) -> Result<i64, TokenError> {
    if ttl.as_secs() == 0 {
        return Err(TokenError::Signing(
            "token lifetime must be at least one second".to_string(),
        ));
    }
    if ttl > MAX_TOKEN_TTL {
        return Err(TokenError::Signing(format!(
            "token lifetime of {}s exceeds the {}s maximum",
            ttl.as_secs(),
            MAX_TOKEN_TTL.as_secs()
        )));
    }
    i64::try_from(ttl.as_secs())
        .map_err(|_| TokenError::Signing("token lifetime out of range".to_string()))
}
