/// User persistence
///
/// Handlers talk to a [`UserStore`] trait object so the same routes run on
/// PostgreSQL in production and on an in-memory map in tests or when no
/// database is configured.
///
/// # Contract
///
/// - `create` rejects a second account with an existing email atomically,
///   returning [`StoreError::DuplicateEmail`]; it never inserts a duplicate
/// - Username lookups resolve to the oldest account with that username
/// - `update_by_username` writes only the supplied fields
///
/// # Example
///
/// ```
/// use solarcast_shared::models::user::NewUser;
/// use solarcast_shared::store::{memory::InMemoryUserStore, StoreError, UserStore};
///
/// # async fn example() -> Result<(), StoreError> {
/// let store = InMemoryUserStore::new();
/// let new_user = NewUser {
///     username: "kasun".to_string(),
///     email: "kasun@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     functions: vec![],
/// };
///
/// store.create(new_user.clone()).await?;
/// assert!(matches!(store.create(new_user).await, Err(StoreError::DuplicateEmail)));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

use crate::models::user::{NewUser, UpdateUser, User};

pub mod memory;
pub mod postgres;

/// Errors surfaced by a user store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another account already uses this email
    #[error("A user with this email already exists")]
    DuplicateEmail,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations the HTTP layer needs
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Inserts a new user, rejecting duplicate emails
    async fn create(&self, data: NewUser) -> StoreResult<User>;

    /// Looks up a user by email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Looks up the oldest user with this username
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Lists every user, newest first
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Applies a partial update; `None` if the username is unknown
    async fn update_by_username(&self, username: &str, data: UpdateUser)
        -> StoreResult<Option<User>>;

    /// Deletes by username; false if the username is unknown
    async fn delete_by_username(&self, username: &str) -> StoreResult<bool>;

    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}
