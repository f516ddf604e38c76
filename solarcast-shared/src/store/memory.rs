/// In-memory [`UserStore`]
///
/// Keeps users in insertion order behind a `tokio::sync::RwLock`. Duplicate
/// checks and inserts happen under one write guard, so concurrent signups
/// with the same email cannot both succeed. Data is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::models::user::{NewUser, UpdateUser, User};

/// Volatile user store for tests and database-less runs
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// True when no users are stored
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            functions: data.functions,
            created_at: now,
            updated_at: now,
        };

        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().rev().cloned().collect())
    }

    async fn update_by_username(
        &self,
        username: &str,
        data: UpdateUser,
    ) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| u.username == username) else {
            return Ok(None);
        };

        if data.is_empty() {
            return Ok(Some(users[index].clone()));
        }

        if let Some(email) = &data.email {
            let taken = users
                .iter()
                .enumerate()
                .any(|(i, u)| i != index && &u.email == email);
            if taken {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let user = &mut users[index];
        data.apply_to(user);
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_by_username(&self, username: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;

        match users.iter().position(|u| u.username == username) {
            Some(index) => {
                users.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
