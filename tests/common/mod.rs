// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokengate::config::Config;
use tokengate::db::{
    InMemoryUserRepository, MemorySessionStore, RepositoryError, SessionStore, StoreError,
    UserRepository,
};
use tokengate::models::{SignUp, User};
use tokengate::routes::create_router;
use tokengate::services::{
    ManualClock, PasswordError, PasswordHasher, SessionManager, TokenService,
};
use tokengate::AppState;
use uuid::Uuid;

/// Fixed start time for the manual clock.
#[allow(dead_code)]
pub const T0: i64 = 1_700_000_000;

/// Check if a Redis server is available via environment variable.
#[allow(dead_code)]
pub fn redis_available() -> bool {
    std::env::var("REDIS_URL").is_ok()
}

/// Skip test with message if Redis not available.
#[macro_export]
macro_rules! require_redis {
    () => {
        if !crate::common::redis_available() {
            eprintln!("⚠️  Skipping: REDIS_URL not set");
            return;
        }
    };
}

/// Cheap stand-in for Argon2 so tests don't pay for key stretching.
#[derive(Clone, Copy)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(format!("plain${}", plaintext))
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        hash.strip_prefix("plain$") == Some(plaintext)
    }
}

/// Session store wrapper that can be switched to fail, and counts calls.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemorySessionStore,
    /// Fail every call while set
    pub down: Arc<AtomicBool>,
    /// Fail only the next N calls
    pub fail_next: Arc<AtomicUsize>,
    /// Yield to the scheduler before reads and writes, so concurrent
    /// flows interleave the way they would against a networked store
    pub yielding: Arc<AtomicBool>,
    pub calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn set_yielding(&self, yielding: bool) {
        self.yielding.store(yielding, Ordering::SeqCst);
    }

    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "connection refused (redis://:secret@cache:6379)".to_string(),
            ));
        }
        let pending = self.fail_next.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_next.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        Ok(())
    }

    async fn maybe_yield(&self) {
        if self.yielding.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn put(&self, subject: &str, refresh_token: &str) -> Result<(), StoreError> {
        self.check()?;
        self.maybe_yield().await;
        self.inner.put(subject, refresh_token).await
    }

    async fn get(&self, subject: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        self.maybe_yield().await;
        self.inner.get(subject).await
    }

    async fn delete(&self, subject: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(subject).await
    }
}

/// Session store that never answers.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct HangingStore;

#[async_trait]
impl SessionStore for HangingStore {
    async fn put(&self, _subject: &str, _refresh_token: &str) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn get(&self, _subject: &str) -> Result<Option<String>, StoreError> {
        std::future::pending().await
    }

    async fn delete(&self, _subject: &str) -> Result<(), StoreError> {
        std::future::pending().await
    }
}

/// User repository wrapper that can be switched to fail or to hang.
#[derive(Clone, Default)]
pub struct FlakyRepository {
    pub inner: InMemoryUserRepository,
    /// Every call fails while set
    pub down: Arc<AtomicBool>,
    /// Every call never completes while set
    pub hung: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FlakyRepository {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn set_hung(&self, hung: bool) {
        self.hung.store(hung, Ordering::SeqCst);
    }

    async fn check(&self) -> Result<(), RepositoryError> {
        if self.hung.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "connection refused (postgres://app:secret@db/users)".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FlakyRepository {
    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.check().await?;
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        self.check().await?;
        self.inner.find_by_id(id).await
    }

    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        self.check().await?;
        self.inner.create(user).await
    }
}

/// Everything a session test needs, with handles to the fakes.
#[allow(dead_code)]
pub struct Harness {
    pub config: Config,
    pub sessions: SessionManager,
    pub tokens: TokenService,
    /// Backing data of `repo`, reachable even while `repo` is failing
    pub users: InMemoryUserRepository,
    pub repo: FlakyRepository,
    pub store: FlakyStore,
    pub clock: ManualClock,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_store_factory(|flaky| Arc::new(flaky.clone()))
    }

    pub fn with_store_factory(
        make_store: impl FnOnce(&FlakyStore) -> Arc<dyn SessionStore>,
    ) -> Self {
        let config = Config::test_default();
        let tokens = TokenService::from_config(&config).expect("test keys are valid");
        let repo = FlakyRepository::default();
        let users = repo.inner.clone();
        let store = FlakyStore::default();
        let clock = ManualClock::new(T0);

        let sessions = SessionManager::new(
            tokens.clone(),
            Arc::new(repo.clone()),
            make_store(&store),
            Arc::new(PlainHasher),
            Arc::new(clock.clone()),
        )
        .with_timeouts(Duration::from_millis(200), Duration::ZERO);

        Self {
            config,
            sessions,
            tokens,
            users,
            repo,
            store,
            clock,
        }
    }

    pub fn access_ttl(&self) -> i64 {
        self.tokens.access_ttl_secs()
    }

    pub fn refresh_ttl(&self) -> i64 {
        self.tokens.refresh_ttl_secs()
    }

    /// Sign up a user and return its id as a string.
    pub async fn sign_up(&self, email: &str, role: &str) -> String {
        let user = self
            .sessions
            .sign_up(&sign_up_request(email, role))
            .await
            .expect("sign-up should succeed");
        user.id.to_string()
    }

    /// Stored refresh token for `subject`, bypassing failure injection.
    pub async fn stored(&self, subject: &str) -> Option<String> {
        self.store.inner.get(subject).await.unwrap()
    }

    /// Router over this harness's session manager.
    pub fn router(&self) -> axum::Router {
        let state = Arc::new(AppState {
            config: self.config.clone(),
            sessions: self.sessions.clone(),
        });
        create_router(state)
    }
}

#[allow(dead_code)]
pub const PASSWORD: &str = "correct horse battery";

#[allow(dead_code)]
pub fn sign_up_request(email: &str, role: &str) -> SignUp {
    SignUp {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        user_role: role.to_string(),
    }
}
