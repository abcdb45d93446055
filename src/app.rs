//! Application façade used by the screens
//!
//! Wires the session manager, the daily cache and the remote clients together
//! and exposes one method per user action. Protected actions require an
//! authenticated session.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, AuthClient, NutritionClient, Registration};
use crate::cache::{CacheKey, Clock, DailyCache, Fetched, LocalClock};
use crate::config::{Config, ConfigError};
use crate::data::{MealPlanRecord, MealPlanRequest, SavedSearch};
use crate::session::{AuthState, SessionError, SessionManager};
use crate::store::{FileStore, KeyValueStore};

/// Errors surfaced to the user
#[derive(Debug, Error)]
pub enum AppError {
    /// A protected action was attempted without a valid session
    #[error("Not logged in")]
    NotAuthenticated,

    /// User input was rejected before any request was made
    #[error("{0}")]
    InvalidInput(String),

    /// Login or logout could not be committed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A remote service call failed
    #[error(transparent)]
    Remote(#[from] ApiError),

    /// Configuration is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Coarse classification used to decide how a failure is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Durable storage failed
    Persistence,
    /// Network failure or non-success response
    RemoteFetch,
    NotAuthenticated,
    InvalidInput,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotAuthenticated | AppError::Session(SessionError::NotInitialized) => {
                ErrorKind::NotAuthenticated
            }
            AppError::InvalidInput(_) | AppError::Config(_) => ErrorKind::InvalidInput,
            AppError::Session(SessionError::Persistence(_)) => ErrorKind::Persistence,
            // An empty token can only come from the auth service
            AppError::Session(SessionError::EmptyToken) | AppError::Remote(_) => {
                ErrorKind::RemoteFetch
            }
        }
    }

    /// Whether re-triggering the same action may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::RemoteFetch | ErrorKind::Persistence)
    }
}

/// Entry point for every user action
pub struct App {
    session: SessionManager,
    cache: DailyCache,
    auth: Arc<AuthClient>,
    nutrition: NutritionClient,
    search_limit: u32,
}

impl App {
    /// Builds an App persisting to the configured data directory
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::with_dir(config.resolve_data_dir()?));
        Ok(Self::with_parts(
            store,
            Arc::new(LocalClock),
            AuthClient::new(&config.auth_url),
            NutritionClient::new(&config.nutrition_url, &config.api_key),
            config.search_limit,
        ))
    }

    /// Builds an App from explicit collaborators
    pub fn with_parts(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        auth: AuthClient,
        nutrition: NutritionClient,
        search_limit: u32,
    ) -> Self {
        let auth = Arc::new(auth);
        Self {
            session: SessionManager::new(store.clone(), auth.clone()),
            cache: DailyCache::new(store, clock),
            auth,
            nutrition,
            search_limit,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Runs startup session validation; must complete before protected screens show
    pub async fn start(&self) -> AuthState {
        self.session.initialize().await
    }

    /// Logs in against the auth service and commits the session
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter your email and password.".to_string(),
            ));
        }
        self.session.initialize().await;

        let token = self.auth.login(email.trim(), password).await?;
        self.session.login(&token).await?;
        info!("logged in");
        Ok(())
    }

    /// Creates an account and commits the session for it
    pub async fn register(&self, registration: &Registration) -> Result<(), AppError> {
        let missing = [
            &registration.email,
            &registration.username,
            &registration.password,
            &registration.phone_number,
        ]
        .iter()
        .any(|field| field.trim().is_empty());
        if missing {
            return Err(AppError::InvalidInput("Please fill all the fields.".to_string()));
        }
        self.session.initialize().await;

        let token = self.auth.register(registration).await?;
        self.session.login(&token).await?;
        info!("registered and logged in");
        Ok(())
    }

    /// Ends the session and clears both cached results
    pub async fn logout(&self) -> Result<(), AppError> {
        self.session.initialize().await;
        self.session.logout().await?;

        for key in CacheKey::all() {
            if let Err(e) = self.cache.invalidate(key).await {
                warn!(key = key.as_str(), error = %e, "failed to clear cached result on logout");
            }
        }
        Ok(())
    }

    fn require_authenticated(&self) -> Result<(), AppError> {
        match self.session.state() {
            AuthState::Authenticated => Ok(()),
            _ => Err(AppError::NotAuthenticated),
        }
    }

    /// Today's meal plan, if one was generated earlier today
    pub async fn restore_meal_plan(&self) -> Result<Option<MealPlanRecord>, AppError> {
        self.require_authenticated()?;
        Ok(self.cache.load_or_miss(CacheKey::MealPlan).await)
    }

    /// Today's ingredient search, if one was made earlier today
    pub async fn restore_search(&self) -> Result<Option<SavedSearch>, AppError> {
        self.require_authenticated()?;
        Ok(self.cache.load_or_miss(CacheKey::SavedSearch).await)
    }

    /// Produces a meal plan for `request`
    ///
    /// Today's cached plan is reused when it was generated for an equivalent
    /// request and `refresh` is false. Otherwise a new plan is fetched and
    /// replaces the cached one.
    pub async fn generate_meal_plan(
        &self,
        request: MealPlanRequest,
        refresh: bool,
    ) -> Result<Fetched<MealPlanRecord>, AppError> {
        self.require_authenticated()?;
        if request.target_calories == 0 {
            return Err(AppError::InvalidInput(
                "Please enter a calorie target.".to_string(),
            ));
        }
        let request = request.normalized();

        let fetched = self
            .cache
            .get_or_fetch(
                CacheKey::MealPlan,
                |cached: &MealPlanRecord| !refresh && cached.answers(&request),
                || async {
                    let meal_plan = self.nutrition.generate_meal_plan(&request).await?;
                    Ok::<_, ApiError>(MealPlanRecord {
                        meal_plan,
                        request: Some(request.clone()),
                    })
                },
            )
            .await?;
        Ok(fetched)
    }

    /// Looks up ingredients matching `query` with their nutrition
    ///
    /// Today's cached search is reused when it was made for the same query and
    /// `refresh` is false. A different query replaces the cached search.
    pub async fn search(&self, query: &str, refresh: bool) -> Result<Fetched<SavedSearch>, AppError> {
        self.require_authenticated()?;
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter an ingredient to search for.".to_string(),
            ));
        }

        let fetched = self
            .cache
            .get_or_fetch(
                CacheKey::SavedSearch,
                |cached: &SavedSearch| !refresh && cached.matches_query(query),
                || self.nutrition.search_ingredients(query, self.search_limit),
            )
            .await?;
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::TestServer;
    use crate::cache::{FixedClock, Origin};
    use crate::data::{Diet, TimeFrame};
    use crate::session::TOKEN_KEY;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    const DAY_PLAN: &str = r#"{"meals": [{"id": 1, "imageType": "jpg", "title": "Oatmeal"}], "nutrients": {"calories": 2400.0, "protein": 90.0, "fat": 80.0, "carbohydrates": 300.0}}"#;

    fn routes(line: &str) -> (u16, String) {
        if line.starts_with("GET /api/users/profile") {
            (200, "{}".to_string())
        } else if line.starts_with("POST /auth/login") {
            (200, r#"{"data": {"token": "fresh-token"}}"#.to_string())
        } else if line.starts_with("GET /mealplanner/generate") {
            (200, DAY_PLAN.to_string())
        } else if line.starts_with("GET /food/ingredients/search") {
            (200, r#"{"results": [{"id": 9003, "name": "apple"}]}"#.to_string())
        } else if line.starts_with("GET /food/ingredients/9003/information") {
            (
                200,
                r#"{"id": 9003, "name": "apple", "nutrition": {"nutrients": [{"name": "Calories", "amount": 52, "unit": "kcal"}]}}"#
                    .to_string(),
            )
        } else {
            (404, String::new())
        }
    }

    struct Harness {
        app: App,
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
        server: TestServer,
    }

    impl Harness {
        async fn new(token: Option<&str>) -> Self {
            let server = TestServer::start(routes).await;
            let store = Arc::new(MemoryStore::new());
            if let Some(token) = token {
                store.set(TOKEN_KEY, token).await.expect("Seed should succeed");
            }
            let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
            let app = App::with_parts(
                store.clone(),
                clock.clone(),
                AuthClient::new(&server.base_url),
                NutritionClient::new(&server.base_url, "key"),
                3,
            );
            Self {
                app,
                store,
                clock,
                server,
            }
        }

        fn count(&self, prefix: &str) -> usize {
            self.server
                .requests()
                .iter()
                .filter(|r| r.starts_with(prefix))
                .count()
        }
    }

    #[tokio::test]
    async fn test_protected_actions_require_session() {
        let harness = Harness::new(None).await;
        assert_eq!(harness.app.start().await, AuthState::Unauthenticated);

        let err = harness
            .app
            .generate_meal_plan(MealPlanRequest::default(), false)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotAuthenticated);
        assert!(!err.is_retryable());
        assert_eq!(harness.count("GET /mealplanner"), 0);
    }

    #[tokio::test]
    async fn test_login_commits_session() {
        let harness = Harness::new(None).await;
        harness.app.start().await;

        harness.app.login("a@b.c", "secret").await.expect("Login should succeed");

        assert_eq!(harness.app.session().state(), AuthState::Authenticated);
        assert_eq!(harness.store.peek(TOKEN_KEY).as_deref(), Some("fresh-token"));
    }

    #[tokio::test]
    async fn test_login_with_blank_email_is_invalid_input() {
        let harness = Harness::new(None).await;

        let err = harness.app.login(" ", "secret").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(harness.server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_meal_plan_is_reused_for_same_request_on_same_day() {
        let harness = Harness::new(Some("abc123")).await;
        assert_eq!(harness.app.start().await, AuthState::Authenticated);

        let first = harness
            .app
            .generate_meal_plan(MealPlanRequest::default(), false)
            .await
            .expect("Should fetch");
        let second = harness
            .app
            .generate_meal_plan(MealPlanRequest::default(), false)
            .await
            .expect("Should hit cache");

        assert_eq!(first.origin, Origin::Remote);
        assert_eq!(second.origin, Origin::Cache);
        assert_eq!(second.value.meal_plan.meals[0].title, "Oatmeal");
        assert_eq!(harness.count("GET /mealplanner"), 1);
    }

    #[tokio::test]
    async fn test_meal_plan_changed_request_or_refresh_fetches_again() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;
        harness
            .app
            .generate_meal_plan(MealPlanRequest::default(), false)
            .await
            .expect("Should fetch");

        let vegan = MealPlanRequest {
            time_frame: TimeFrame::Day,
            diet: Some(Diet::Vegan),
            ..Default::default()
        };
        let changed = harness.app.generate_meal_plan(vegan.clone(), false).await.expect("Should fetch");
        let refreshed = harness.app.generate_meal_plan(vegan.clone(), true).await.expect("Should fetch");

        assert_eq!(changed.origin, Origin::Remote);
        assert_eq!(refreshed.origin, Origin::Remote);
        assert_eq!(harness.count("GET /mealplanner"), 3);
        let restored = harness.app.restore_meal_plan().await.expect("Should read").expect("Should exist");
        assert_eq!(restored.request, Some(vegan));
    }

    #[tokio::test]
    async fn test_meal_plan_expires_next_day() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;
        harness
            .app
            .generate_meal_plan(MealPlanRequest::default(), false)
            .await
            .expect("Should fetch");

        harness.clock.advance_days(1);

        assert!(harness.app.restore_meal_plan().await.expect("Should read").is_none());
        let next = harness
            .app
            .generate_meal_plan(MealPlanRequest::default(), false)
            .await
            .expect("Should fetch");
        assert_eq!(next.origin, Origin::Remote);
    }

    #[tokio::test]
    async fn test_zero_calorie_target_is_rejected() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;
        let request = MealPlanRequest {
            target_calories: 0,
            ..Default::default()
        };

        let err = harness.app.generate_meal_plan(request, false).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_search_reuses_same_query_and_replaces_on_new_query() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;

        let first = harness.app.search("apple", false).await.expect("Should fetch");
        let again = harness.app.search(" APPLE ", false).await.expect("Should hit cache");
        let other = harness.app.search("pear", false).await.expect("Should fetch");

        assert_eq!(first.origin, Origin::Remote);
        assert_eq!(again.origin, Origin::Cache);
        assert_eq!(other.origin, Origin::Remote);
        assert_eq!(harness.count("GET /food/ingredients/search"), 2);
        let restored = harness.app.restore_search().await.expect("Should read").expect("Should exist");
        assert_eq!(restored.query, "pear");
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;

        let err = harness.app.search("   ", false).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_search_result_shown_even_if_cache_write_fails() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;
        harness.store.set_fail_writes(true);

        let fetched = harness.app.search("apple", false).await.expect("Should fetch");

        assert_eq!(fetched.value.ingredients.len(), 1);
        assert!(fetched.write_error.is_some());
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_cached_results() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;
        harness.app.search("apple", false).await.expect("Should fetch");
        harness
            .app
            .generate_meal_plan(MealPlanRequest::default(), false)
            .await
            .expect("Should fetch");

        harness.app.logout().await.expect("Logout should succeed");

        assert_eq!(harness.app.session().state(), AuthState::Unauthenticated);
        assert!(harness.store.peek(TOKEN_KEY).is_none());
        assert!(harness.store.peek("mealPlan").is_none());
        assert!(harness.store.peek("savedSearch").is_none());
    }

    #[tokio::test]
    async fn test_logout_failure_is_persistence_error() {
        let harness = Harness::new(Some("abc123")).await;
        harness.app.start().await;
        harness.store.set_fail_writes(true);

        let err = harness.app.logout().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.is_retryable());
        assert_eq!(harness.app.session().state(), AuthState::Authenticated);
    }

    #[tokio::test]
    async fn test_remote_failure_is_retryable_and_leaves_cache_alone() {
        let server = TestServer::start(|line| {
            if line.starts_with("GET /api/users/profile") {
                (200, "{}".to_string())
            } else {
                (503, r#"{"message": "Service unavailable"}"#.to_string())
            }
        })
        .await;
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "abc123").await.expect("Seed should succeed");
        let app = App::with_parts(
            store.clone(),
            Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())),
            AuthClient::new(&server.base_url),
            NutritionClient::new(&server.base_url, "key"),
            3,
        );
        app.start().await;

        let err = app.search("apple", false).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RemoteFetch);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Service unavailable"));
        assert!(store.peek("savedSearch").is_none());
    }
}
