//! Storage layer: session store (Redis) and user repository.

pub mod session_store;
pub mod users;

pub use session_store::{MemorySessionStore, RedisSessionStore, SessionStore, StoreError};
pub use users::{InMemoryUserRepository, RepositoryError, UserRepository};
