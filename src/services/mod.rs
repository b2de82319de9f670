// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod clock;
pub mod password;
pub mod session;
pub mod tokens;

pub use clock::{Clock, ManualClock, SystemClock};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use session::SessionManager;
pub use tokens::{TokenError, TokenService};
