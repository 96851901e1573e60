/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use userdir_api::{app::{build_router, AppState}, config::Config};
/// use userdir_shared::store::MemoryUserStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryUserStore::new()), config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::routes::users::API_KEY_HEADER;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use userdir_shared::directory::UserDirectoryService;
use userdir_shared::store::UserStore;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Directory operations over the configured store
    pub directory: UserDirectoryService,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, config: Config) -> Self {
        Self {
            directory: UserDirectoryService::new(store)
                .with_authenticated_listing(config.listing_requires_api_key),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router
///
/// ```text
/// /
/// ├── GET  /health
/// └── /v1/
///     ├── POST /auth/login
///     └── /users
///         ├── GET  /               ListUsers
///         ├── POST /organization   ListOrganizationUsers
///         ├── POST /register       RegisterUser
///         ├── POST /role           EditUserRole
///         ├── POST /get            GetUser
///         └── POST /delete         DeleteUser
/// ```
///
/// Authenticated operations take the caller's `api_key` in the JSON body, so no
/// route carries an auth layer. `GET /v1/users` has no body and reads the key from
/// the `X-Api-Key` header instead.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new().route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/organization", post(routes::users::list_organization_users))
        .route("/register", post(routes::users::register_user))
        .route("/role", post(routes::users::edit_user_role))
        .route("/get", post(routes::users::get_user))
        .route("/delete", post(routes::users::delete_user));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .max_age(std::time::Duration::from_secs(3600))
}
