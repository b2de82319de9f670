// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User repository interface and an in-memory implementation.

use crate::models::User;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("user not found")]
    NotFound,

    #[error("user with email {0} already exists")]
    AlreadyExists(String),

    #[error("user repository unavailable: {0}")]
    Unavailable(String),
}

/// Persistent user storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<User, RepositoryError>;

    /// Store a new user. Emails are unique, compared case-insensitively.
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
}

/// User repository held in process memory.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<DashMap<Uuid, User>>,
    /// Lowercased email -> id
    by_email: Arc<DashMap<String, Uuid>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a stored user wholesale (role changes, status changes).
    pub fn update(&self, user: User) -> Result<(), RepositoryError> {
        match self.users.get_mut(&user.id) {
            Some(mut existing) => {
                *existing = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let id = self
            .by_email
            .get(&email.to_lowercase())
            .map(|r| *r.value())
            .ok_or(RepositoryError::NotFound)?;
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        self.users
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        // Reserve the email first so two concurrent sign-ups can't both win.
        match self.by_email.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => return Err(RepositoryError::AlreadyExists(user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: None,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            user_status: 1,
            user_role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("ada@example.com")).await.unwrap();

        let by_email = repo.find_by_email("ADA@example.com").await.unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(repo.find_by_id(created.id).await.unwrap().email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("ada@example.com")).await.unwrap();
        assert!(matches!(
            repo.create(user("Ada@Example.com")).await,
            Err(RepositoryError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_user() {
        let repo = InMemoryUserRepository::new();
        assert!(matches!(
            repo.find_by_id(Uuid::new_v4()).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.update(user("x@example.com")),
            Err(RepositoryError::NotFound)
        ));
    }
}
