/// User model and PostgreSQL operations
///
/// A user is identified by a UUID, keyed in practice by email, and looked up
/// by username for profile operations. Usernames are not unique; username
/// lookups resolve to the oldest matching account, lowest id on a tie.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(255) NOT NULL,
///     email VARCHAR(320) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     functions TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use solarcast_shared::models::user::{NewUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     NewUser {
///         username: "ravi".to_string(),
///         email: "ravi@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         functions: vec!["table".to_string(), "graph".to_string()],
///     },
/// )
/// .await?;
///
/// let found = User::find_by_username(&pool, "ravi").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A stored user account
///
/// `password_hash` is an Argon2id PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display/login name, not guaranteed unique
    pub username: String,

    /// Email address, unique across users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Enabled feature flags, e.g. `["table", "graph"]`
    pub functions: Vec<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// Carries the hash, never the plaintext password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub functions: Vec<String>,
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address
    pub email: Option<String>,

    /// Replacement feature-flag list
    pub functions: Option<Vec<String>>,
}

impl UpdateUser {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.functions.is_none()
    }

    /// Applies the supplied fields to an in-memory user
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(functions) = &self.functions {
            user.functions = functions.clone();
        }
    }
}

/// Public profile returned by a username lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
}

/// Directory listing entry (no credential material)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub functions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            functions: user.functions,
            created_at: user.created_at,
        }
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns a database error carrying a unique violation if the email is
    /// already taken.
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, functions)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, functions, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.functions)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, functions, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds the oldest user with the given username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, functions, created_at, updated_at
            FROM users
            WHERE username = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists every user, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, functions, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates the oldest user with the given username
    ///
    /// Only `Some` fields in `data` are written; `updated_at` is bumped when
    /// anything is. An empty update just returns the current row.
    ///
    /// # Returns
    ///
    /// The updated user, or `None` if no user has that username
    pub async fn update_by_username(
        pool: &PgPool,
        username: &str,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_username(pool, username).await;
        }

        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.functions.is_some() {
            bind_count += 1;
            query.push_str(&format!(", functions = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = (SELECT id FROM users WHERE username = $1 ORDER BY created_at ASC, id ASC LIMIT 1) \
             RETURNING id, username, email, password_hash, functions, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(username);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(functions) = data.functions {
            q = q.bind(functions);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes the oldest user with the given username
    ///
    /// # Returns
    ///
    /// True if a user was deleted, false if none matched
    pub async fn delete_by_username(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = (SELECT id FROM users WHERE username = $1 ORDER BY created_at ASC, id ASC LIMIT 1)
            "#,
        )
        .bind(username)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
