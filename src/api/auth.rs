//! Auth service client
//!
//! Covers the three endpoints the client needs: login, registration and the
//! profile check used to validate a persisted token at startup.

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{status_error, ApiError, ProfileCheck};

/// Default base URL of the auth service
pub const DEFAULT_AUTH_URL: &str = "https://fuadfakhruz.blog";

/// Details submitted when creating an account
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Success body: `{ "data": { "token": "..." } }`
#[derive(Debug, Deserialize)]
struct TokenResponse {
    data: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    token: Option<String>,
}

/// Client for the remote auth service
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl Default for AuthClient {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_URL)
    }
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create an AuthClient with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Logs in with email and password
    ///
    /// # Returns
    /// * `Ok(String)` - the bearer token issued by the service
    /// * `Err(ApiError)` - on transport failure, non-200 status or missing token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        self.post_for_token("/auth/login", &Credentials { email, password }, "Invalid credentials")
            .await
    }

    /// Creates an account and returns the token issued for it
    pub async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        self.post_for_token("/auth/register", registration, "Invalid registration details")
            .await
    }

    /// Calls the profile endpoint with `token` as bearer credential
    ///
    /// Only HTTP 200 counts as success; every other status is an error.
    pub async fn fetch_profile(&self, token: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/users/profile", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "profile check answered");
        if status == StatusCode::OK {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(status_error(status, &text, "Token rejected"))
        }
    }

    async fn post_for_token<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            return Err(status_error(status, &text, fallback));
        }

        let parsed: TokenResponse = serde_json::from_str(&text)?;
        parsed
            .data
            .and_then(|d| d.token)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ApiError::MissingToken)
    }
}

impl ProfileCheck for AuthClient {
    fn check_profile<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), ApiError>> {
        Box::pin(self.fetch_profile(token))
    }
}
