//! In-process `UserRepository` for tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::{DomainError, DomainResult, Email, User, UserRepository, Username};

/// Checks and writes happen under one write lock, so uniqueness holds under
/// concurrent creates just as a unique index would enforce it.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// First collision of `candidate` with any stored user other than itself.
fn collision(users: &HashMap<Uuid, User>, candidate: &User) -> Option<DomainError> {
    let others = users.values().filter(|u| u.id() != candidate.id());
    for other in others {
        if other.email() == candidate.email() {
            return Some(DomainError::conflict("email is already registered"));
        }
        if other.username() == candidate.username() {
            return Some(DomainError::conflict("username is already taken"));
        }
    }
    None
}

/// Stored copies never carry pending events.
fn snapshot(user: &User) -> User {
    let mut stored = user.clone();
    stored.clear_events();
    stored
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(&self, user: &mut User) -> DomainResult<()> {
        if user.id().is_some() {
            return Err(DomainError::internal("user is already persisted"));
        }

        let mut users = self.users.write().await;
        if let Some(err) = collision(&users, user) {
            return Err(err);
        }

        let id = Uuid::new_v4();
        user.assign_id(id)?;
        users.insert(id, snapshot(user));
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> DomainResult<User> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user"))
    }

    async fn get_by_email(&self, email: &Email) -> DomainResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email() == email)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user"))
    }

    async fn get_by_username(&self, username: &Username) -> DomainResult<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.username() == username)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user"))
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        let id = user.id().ok_or_else(|| DomainError::not_found("user"))?;
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Err(DomainError::not_found("user"));
        }
        if let Some(err) = collision(&users, user) {
            return Err(err);
        }
        users.insert(id, snapshot(user));
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> DomainResult<()> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("user"))
    }

    async fn exists(&self, email: &Email, username: &Username) -> DomainResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.email() == email || u.username() == username))
    }
}
