/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /v1/                           # API v1 (versioned)
///     ├── /auth/                     # Authentication (public)
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /users/                    # User directory (JWT)
///     ├── /projects/                 # Projects + membership (JWT)
///     └── /tasks/                    # Tasks + lifecycle (JWT)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route-group JWT layer)

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::{jwt, middleware::AuthContext};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. The pool
/// and config are both cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // User directory (JWT required)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/me", get(routes::users::get_current_user))
        .route("/:id", get(routes::users::get_user));

    // Projects and membership (JWT required)
    let project_routes = Router::new()
        .route("/", get(routes::projects::list_projects))
        .route("/", post(routes::projects::create_project))
        .route("/user", get(routes::projects::list_my_projects))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", put(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/members/:user_id", post(routes::projects::add_member))
        .route(
            "/:id/members/:user_id",
            delete(routes::projects::remove_member),
        );

    // Tasks and lifecycle (JWT required)
    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/assigned", get(routes::tasks::list_assigned_tasks))
        .route("/project/:project_id", get(routes::tasks::list_project_tasks))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/status", patch(routes::tasks::update_task_status))
        .route("/:id/progress", patch(routes::tasks::update_task_progress))
        .route("/:id/assign/:user_id", patch(routes::tasks::assign_task));

    let jwt_layer = axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes.layer(jwt_layer.clone()))
        .nest("/projects", project_routes.layer(jwt_layer.clone()))
        .nest("/tasks", task_routes.layer(jwt_layer));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(cors),
        )
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the Bearer token from the Authorization header,
/// then injects an [`AuthContext`] into request extensions. Every handler
/// behind this layer receives the caller identity as an explicit argument.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    Ok(next.run(req).await)
}
