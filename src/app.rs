use axum::{
    http::{header, HeaderValue, Method, Uri},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::credentials::UserDirectory;
use crate::auth::TokenService;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{self, DatabaseError, TaskRepository};
use crate::error::ApiError;
use crate::handlers::public;
use crate::middleware::{authenticate, require_user_role};
use crate::services::TaskService;

/// Shared, cheaply cloneable handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub tokens: Arc<TokenService>,
    pub users: Arc<UserDirectory>,
}

impl AppState {
    pub fn new(repository: Arc<dyn TaskRepository>, security: &SecurityConfig) -> Self {
        Self {
            tasks: TaskService::new(repository),
            tokens: Arc::new(TokenService::from_config(security)),
            users: Arc::new(UserDirectory::new(security.users.clone())),
        }
    }

    /// Connects to the configured store and ensures the schema exists.
    pub async fn initialize(config: &AppConfig) -> Result<Self, DatabaseError> {
        let repository = database::connect(&config.database).await?;
        repository.migrate().await?;

        let state = Self::new(repository, &config.security);
        if state.users.is_empty() {
            tracing::warn!("No users configured; every login will fail");
        } else {
            tracing::info!("Loaded {} user(s)", state.users.len());
        }
        Ok(state)
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/auth/login", post(public::auth::login_post))
        // Protected
        .merge(task_routes())
        .fallback(fallback)
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    if config.security.enable_cors {
        app = app.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn task_routes() -> Router<AppState> {
    use crate::handlers::protected::tasks;

    Router::new()
        .route("/api/tasks", get(tasks::tasks_get).post(tasks::tasks_post))
        .route(
            "/api/tasks/:id",
            get(tasks::task_get).put(tasks::task_put).delete(tasks::task_delete),
        )
        .route_layer(middleware::from_fn(require_user_role))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
