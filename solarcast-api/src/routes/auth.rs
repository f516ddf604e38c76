/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Signup
/// - Login
///
/// # Endpoints
///
/// - `POST /api/signup` - Create an account
/// - `POST /api/login` - Verify credentials and get a token
///
/// Argon2id is memory-hard, so hashing and verification run on the blocking
/// thread pool instead of the async workers.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{validate_request, MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use solarcast_shared::{
    auth::{jwt, password},
    models::user::{NewUser, User},
};
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Signup request
///
/// Missing fields deserialize as empty strings so they are reported by
/// validation rather than rejected by the JSON extractor.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, hashed before storage
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed session token
    pub token: String,

    /// Account username
    pub username: String,

    /// Enabled feature flags
    pub functions: Vec<String>,
}

/// Hashes the password and stores a new user
///
/// Shared by signup and the directory's add-user endpoint. Duplicate emails
/// are rejected by the store itself, which makes the check atomic.
pub(crate) async fn register(
    state: &AppState,
    username: String,
    email: String,
    plaintext: String,
    functions: Vec<String>,
) -> ApiResult<User> {
    let password_hash =
        tokio::task::spawn_blocking(move || password::hash_password(&plaintext)).await??;

    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
            functions,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "User creation rejected");
            ApiError::from(e)
        })?;

    info!(user_id = %user.id, username = %user.username, "User created");
    Ok(user)
}

/// Create an account
///
/// # Endpoint
///
/// ```text
/// POST /api/signup
/// Content-Type: application/json
///
/// {
///   "username": "nimal",
///   "email": "nimal@example.com",
///   "password": "monsoon"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "message": "User registered successfully" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unreadable body, validation failed or email already
///   registered
/// - `500 Internal Server Error`: Storage or hashing failure
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = payload?;
    validate_request(&req)?;

    register(&state, req.username, req.email, req.password, Vec::new()).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// {
///   "email": "nimal@example.com",
///   "password": "monsoon"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "username": "nimal",
///   "functions": ["table", "graph"]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unreadable body, validation failed or invalid
///   credentials (unknown email and wrong password look the same)
/// - `500 Internal Server Error`: Storage failure or corrupt stored hash
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    validate_request(&req)?;

    let plaintext = req.password;
    let Some(user) = state.users.find_by_email(&req.email).await? else {
        tokio::task::spawn_blocking(move || password::verify_dummy(&plaintext)).await?;
        warn!("Login failed: unknown email");
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    };

    let stored_hash = user.password_hash.clone();
    let is_valid =
        tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &stored_hash))
            .await??;

    if !is_valid {
        warn!(user_id = %user.id, "Login failed: password mismatch");
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let token = jwt::issue_token(user.id, state.jwt_secret(), state.config.token_ttl())?;

    info!(user_id = %user.id, functions = ?user.functions, "User logged in");

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        functions: user.functions,
    }))
}
