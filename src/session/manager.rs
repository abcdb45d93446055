//! Session manager owning the bearer token and the authentication state
//!
//! State machine:
//!
//! ```text
//! Unknown --initialize--> Authenticated | Unauthenticated
//! Unauthenticated --login--> Authenticated
//! Authenticated --logout--> Unauthenticated
//! ```
//!
//! No transition re-enters `Unknown`. Startup validation runs at most once per
//! manager; concurrent `initialize` calls share the same validation.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::api::ProfileCheck;
use crate::store::{KeyValueStore, StoreError};

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "jwtToken";

/// Whether the user may access protected screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Startup validation has not completed yet
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    /// True once startup validation has produced a definite answer
    pub fn is_settled(&self) -> bool {
        *self != AuthState::Unknown
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Unknown => "checking session",
            AuthState::Authenticated => "logged in",
            AuthState::Unauthenticated => "logged out",
        }
    }
}

/// Errors reported by login and logout
#[derive(Debug, Error)]
pub enum SessionError {
    /// Called before startup validation completed
    #[error("Session is still being validated")]
    NotInitialized,

    /// Login was given a blank token
    #[error("Authentication token is empty")]
    EmptyToken,

    /// The token could not be written or removed
    #[error("Failed to persist session: {0}")]
    Persistence(#[from] StoreError),
}

/// Single source of truth for the authentication state
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    profile: Arc<dyn ProfileCheck>,
    state: watch::Sender<AuthState>,
    /// Completes when startup validation has run
    startup: OnceCell<()>,
    /// Held for the whole of each transition (persist, then publish)
    transition: Mutex<()>,
}

impl SessionManager {
    /// Creates a manager in the `Unknown` state
    pub fn new(store: Arc<dyn KeyValueStore>, profile: Arc<dyn ProfileCheck>) -> Self {
        let (state, _) = watch::channel(AuthState::Unknown);
        Self {
            store,
            profile,
            state,
            startup: OnceCell::new(),
            transition: Mutex::new(()),
        }
    }

    /// Current authentication state
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Read-only view of the state; receivers see every committed transition
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Validates the persisted token against the auth service
    ///
    /// Runs the validation once. Callers arriving while it is in flight wait
    /// for the same result; later calls return the current state without any
    /// network traffic. The returned state is never `Unknown`.
    pub async fn initialize(&self) -> AuthState {
        self.startup
            .get_or_init(|| self.validate_persisted_token())
            .await;
        self.state()
    }

    async fn validate_persisted_token(&self) {
        let _guard = self.transition.lock().await;

        let token = match self.store.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read persisted token, starting logged out");
                None
            }
        };

        let next = match token {
            None => {
                debug!("no persisted token");
                AuthState::Unauthenticated
            }
            Some(token) if token.trim().is_empty() => {
                debug!("persisted token is blank");
                self.discard_token().await;
                AuthState::Unauthenticated
            }
            Some(token) => match self.profile.check_profile(&token).await {
                Ok(()) => AuthState::Authenticated,
                Err(e) => {
                    info!(error = %e, "persisted token rejected");
                    self.discard_token().await;
                    AuthState::Unauthenticated
                }
            },
        };

        self.publish(next);
    }

    async fn discard_token(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY).await {
            warn!(error = %e, "failed to remove rejected token");
        }
    }

    /// Persists `token` and moves to `Authenticated`
    ///
    /// The token is trusted as issued by a successful auth call. If it cannot
    /// be persisted the state is left unchanged.
    pub async fn login(&self, token: &str) -> Result<(), SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }

        let _guard = self.transition.lock().await;
        self.ensure_settled()?;

        self.store.set(TOKEN_KEY, token).await?;
        self.publish(AuthState::Authenticated);
        Ok(())
    }

    /// Removes the persisted token and moves to `Unauthenticated`
    ///
    /// Succeeds when no token is stored. If removal fails the state is left
    /// unchanged.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _guard = self.transition.lock().await;
        self.ensure_settled()?;

        self.store.remove(TOKEN_KEY).await?;
        self.publish(AuthState::Unauthenticated);
        Ok(())
    }

    fn ensure_settled(&self) -> Result<(), SessionError> {
        if self.state().is_settled() {
            Ok(())
        } else {
            Err(SessionError::NotInitialized)
        }
    }

    fn publish(&self, next: AuthState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(from = previous.label(), to = next.label(), "auth state changed");
        }
    }
}
