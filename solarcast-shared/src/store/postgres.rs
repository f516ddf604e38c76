/// PostgreSQL-backed [`UserStore`]
///
/// Thin adapter over the queries on [`User`]; email uniqueness comes from the
/// `users.email` unique constraint, which sqlx reports as a unique violation
/// and [`StoreError`] turns into `DuplicateEmail`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreResult, UserStore};
use crate::db::pool::health_check;
use crate::models::user::{NewUser, UpdateUser, User};

/// User store over a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Borrows the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn update_by_username(
        &self,
        username: &str,
        data: UpdateUser,
    ) -> StoreResult<Option<User>> {
        Ok(User::update_by_username(&self.pool, username, data).await?)
    }

    async fn delete_by_username(&self, username: &str) -> StoreResult<bool> {
        Ok(User::delete_by_username(&self.pool, username).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
