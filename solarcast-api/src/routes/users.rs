/// User directory endpoints
///
/// # Endpoints
///
/// - `GET /api/users` - List users, newest first
/// - `POST /api/user` - Add a user with feature flags
/// - `GET /api/user/:username` - Profile lookup
/// - `PUT /api/update/:username` - Partial update of email and flags
/// - `DELETE /api/delete/:username` - Remove a user
///
/// Usernames are not unique; every `:username` operation acts on the oldest
/// account with that name. Listings never include password hashes.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{auth::register, validate_request, MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use solarcast_shared::models::user::{UpdateUser, UserProfile, UserSummary};
use tracing::info;
use validator::Validate;

const USER_NOT_FOUND: &str = "User not found";

/// User listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserSummary>,
}

/// Add-user request
#[derive(Debug, Deserialize, Validate)]
pub struct AddUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Feature flags, e.g. `["table", "graph"]`; defaults to none
    #[serde(default)]
    pub functions: Vec<String>,
}

/// Partial update request
///
/// An absent or empty `email` leaves the stored email unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub functions: Option<Vec<String>>,
}

impl UpdateUserRequest {
    fn into_update(self) -> UpdateUser {
        UpdateUser {
            email: self.email,
            functions: self.functions,
        }
    }
}

/// List all users
///
/// # Response
///
/// ```json
/// {
///   "users": [
///     {
///       "id": "uuid",
///       "username": "nimal",
///       "email": "nimal@example.com",
///       "functions": ["table"],
///       "created_at": "2024-02-12T08:00:00Z"
///     }
///   ]
/// }
/// ```
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<ListUsersResponse>> {
    let users: Vec<UserSummary> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();

    Ok(Json(ListUsersResponse { users }))
}

/// Add a user with an initial set of feature flags
///
/// # Endpoint
///
/// ```text
/// POST /api/user
/// Content-Type: application/json
///
/// {
///   "username": "kumari",
///   "email": "kumari@example.com",
///   "password": "kandy-hills",
///   "functions": ["table", "graph"]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unreadable body, validation failed or email already
///   registered
/// - `500 Internal Server Error`: Storage or hashing failure
pub async fn add_user(
    State(state): State<AppState>,
    payload: Result<Json<AddUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = payload?;
    validate_request(&req)?;

    register(&state, req.username, req.email, req.password, req.functions).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User added successfully")),
    ))
}

/// Look up a user's public profile
///
/// # Response
///
/// ```json
/// { "username": "nimal", "email": "nimal@example.com" }
/// ```
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(UserProfile::from(&user)))
}

/// Update a user's email and/or feature flags
///
/// # Endpoint
///
/// ```text
/// PUT /api/update/nimal
/// Content-Type: application/json
///
/// { "functions": ["table", "map"] }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unreadable body, invalid email, or email held by
///   another user
/// - `404 Not Found`: Unknown username
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(mut req) = payload?;
    req.email = req.email.filter(|email| !email.is_empty());
    validate_request(&req)?;

    let update = req.into_update();
    let updated = state
        .users
        .update_by_username(&username, update.clone())
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    info!(
        user_id = %updated.id,
        username = %username,
        email_changed = update.email.is_some(),
        functions_changed = update.functions.is_some(),
        "User updated"
    );

    Ok(Json(MessageResponse::new("User details updated successfully")))
}

/// Delete a user
///
/// # Errors
///
/// - `404 Not Found`: Unknown username; nothing is removed
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.users.delete_by_username(&username).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    info!(username = %username, "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
