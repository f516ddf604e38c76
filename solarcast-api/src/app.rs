/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use solarcast_api::{app::AppState, config::Config};
/// use solarcast_shared::store::memory::InMemoryUserStore;
/// use solarcast_shared::weather::{WeatherApiClient, WeatherApiConfig, WeatherService};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let client = WeatherApiClient::new(WeatherApiConfig {
///     api_key: config.weather.api_key.clone(),
///     base_url: config.weather.base_url.clone(),
///     timeout_seconds: config.weather.timeout_seconds,
/// })?;
///
/// let state = AppState::new(
///     Arc::new(InMemoryUserStore::new()),
///     WeatherService::new(Arc::new(client)),
///     config,
/// );
/// let app = solarcast_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use solarcast_shared::store::UserStore;
use solarcast_shared::weather::WeatherService;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is behind an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// User persistence backend
    pub users: Arc<dyn UserStore>,

    /// Weather proxy
    pub weather: WeatherService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(users: Arc<dyn UserStore>, weather: WeatherService, config: Config) -> Self {
        Self {
            users,
            weather,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check
/// └── /api/
///     ├── POST   /signup             # Create account
///     ├── POST   /login              # Verify credentials, issue token
///     ├── GET    /users              # List users
///     ├── POST   /user               # Add user with feature flags
///     ├── GET    /user/:username     # Profile lookup
///     ├── PUT    /update/:username   # Partial update
///     ├── DELETE /delete/:username   # Remove user
///     ├── GET    /currentWeather     # ?city&country
///     └── GET    /futureWeather      # ?city&country, six days
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let api_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/users", get(routes::users::list_users))
        .route("/user", post(routes::users::add_user))
        .route("/user/:username", get(routes::users::get_user))
        .route("/update/:username", put(routes::users::update_user))
        .route("/delete/:username", delete(routes::users::delete_user))
        .route("/currentWeather", get(routes::weather::current_weather))
        .route("/futureWeather", get(routes::weather::future_weather));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
