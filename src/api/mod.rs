//! Clients for the remote auth and nutrition services
//!
//! Neither client retries: every failure is returned to the caller, who
//! decides whether the user should re-trigger the action.

pub mod auth;
pub mod nutrition;

#[cfg(test)]
pub(crate) mod test_server;

pub use auth::{AuthClient, Registration};
pub use nutrition::NutritionClient;

use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling a remote service
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Auth service reported success but sent no token
    #[error("Token not received from server")]
    MissingToken,

    /// Failed to parse the response body
    #[error("Failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failure, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Checks whether a bearer token is still accepted by the auth service
pub trait ProfileCheck: Send + Sync {
    /// `Ok(())` only when the profile endpoint answers HTTP 200
    fn check_profile<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), ApiError>>;
}

/// Error body shape shared by both services
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Builds a status error, preferring the server's own message
fn status_error(status: reqwest::StatusCode, body: &str, fallback: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
