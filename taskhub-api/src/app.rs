/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, managers::TaskManager};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::auth::{
    manager::UserManager,
    middleware::{authenticate, bearer_token},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; all fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    pub config: Arc<Config>,

    pub users: UserManager,

    pub tasks: TaskManager,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let users = UserManager::new(db.clone(), config.jwt.secret.clone())
            .with_access_lifetime(Duration::seconds(config.jwt.lifetime_seconds));
        let tasks = TaskManager::new(db.clone(), config.tasks.owner_policy);

        Self {
            db,
            config: Arc::new(config),
            users,
            tasks,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET    /health
/// ├── /auth/
/// │   ├── POST /register
/// │   ├── POST /jwt/login
/// │   ├── POST /jwt/logout              (bearer)
/// │   ├── POST /forgot-password
/// │   ├── POST /reset-password
/// │   ├── POST /request-verify-token
/// │   └── POST /verify
/// ├── GET    /authenticated-route       (bearer)
/// ├── /tasks                            (bearer)
/// │   ├── GET  POST        /
/// │   └── GET  PUT  DELETE /:id
/// └── /users                            (bearer)
///     ├── GET  PATCH       /me
///     ├── GET  POST        /            (admin)
///     └── GET  PATCH       /:id         (admin)
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/jwt/login", post(routes::auth::login))
        .route("/auth/forgot-password", post(routes::auth::forgot_password))
        .route("/auth/reset-password", post(routes::auth::reset_password))
        .route(
            "/auth/request-verify-token",
            post(routes::auth::request_verify_token),
        )
        .route("/auth/verify", post(routes::auth::verify));

    let protected_routes = Router::new()
        .route("/auth/jwt/logout", post(routes::auth::logout))
        .route(
            "/authenticated-route",
            get(routes::authenticated::authenticated_route),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/users/me",
            get(routes::users::get_me).patch(routes::users::update_me),
        )
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:id",
            get(routes::users::get_user).patch(routes::users::update_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware
///
/// Resolves the caller and injects a `Principal` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;
    let principal = authenticate(&state.db, state.jwt_secret(), token).await?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
