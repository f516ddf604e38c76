/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 session token issuance and validation
///
/// # Example
///
/// ```
/// use solarcast_shared::auth::{jwt, password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = password::hash_password("user_password")?;
/// assert!(password::verify_password("user_password", &hash)?);
///
/// let token = jwt::issue_token(Uuid::new_v4(), "secret-key-of-at-least-32-bytes!", None)?;
/// assert!(!token.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
