/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup and login
/// - `users`: User directory (list, add, get, update, delete)
/// - `weather`: Current conditions and six-day forecast

pub mod auth;
pub mod health;
pub mod users;
pub mod weather;

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Plain acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Runs `validator` rules and converts failures into a 400
pub(crate) fn validate_request<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate().map_err(ApiError::from_validation)
}
