//! Authentication session lifecycle
//!
//! The [`SessionManager`] is the single owner of the persisted bearer token and
//! of the authentication state. Everything else observes that state through a
//! read-only `watch` subscription.

mod manager;

pub use manager::{AuthState, SessionError, SessionManager, TOKEN_KEY};
