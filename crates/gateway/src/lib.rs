//! PaperHub API Gateway
//!
//! REST layer over the PaperHub repository:
//! - Authentication (bearer JWT)
//! - Per-IP fixed-window rate limiting
//! - Papers, discussion, reviews, bookmarks, notifications, claims
//! - Observability (request spans, Prometheus metrics)

pub mod handlers;
pub mod middleware;

use axum::{
    extract::FromRef,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use middleware::rate_limit::{rate_limit_middleware, FixedWindowLimiter};
use paperhub_common::{
    auth::JwtManager,
    config::{AppConfig, ConfigError},
    db::{DbPool, Repository},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub jwt: Arc<JwtManager>,
    pub limiters: Limiters,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

/// The general API limiter and the stricter one in front of `/api/auth`
#[derive(Clone)]
pub struct Limiters {
    pub api: Arc<FixedWindowLimiter>,
    pub auth: Arc<FixedWindowLimiter>,
}

impl Limiters {
    pub fn from_config(config: &AppConfig) -> Self {
        let rl = &config.rate_limit;
        Self {
            api: Arc::new(FixedWindowLimiter::new("api", rl.window(), rl.max_requests)),
            auth: Arc::new(FixedWindowLimiter::new("auth", rl.window(), rl.auth_max_requests)),
        }
    }
}

impl AppState {
    /// Fails when no JWT secret is configured
    pub fn new(config: AppConfig, db: DbPool) -> Result<Self, ConfigError> {
        let jwt = Arc::new(JwtManager::new(
            config.auth.jwt_secret()?,
            config.auth.jwt_expiration_secs,
        ));
        let limiters = Limiters::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            db,
            jwt,
            limiters,
            metrics: None,
        })
    }

    /// Repository over the shared pool
    pub fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Create the main application router
pub fn build_router(state: AppState) -> Router {
    use handlers::*;

    let rate_limited = state.config.rate_limit.enabled;

    let mut auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me).put(auth::update_me));

    if rate_limited {
        auth_routes = auth_routes.layer(from_fn_with_state(
            state.limiters.auth.clone(),
            rate_limit_middleware,
        ));
    }

    let mut api_routes = Router::new()
        .nest("/auth", auth_routes)
        // Users
        .route("/users/{id}", get(users::get_user))
        // Papers
        .route("/papers", get(papers::list_papers).post(papers::create_paper))
        .route("/papers/mine", get(papers::my_papers))
        .route(
            "/papers/{id}",
            get(papers::get_paper)
                .put(papers::update_paper)
                .delete(papers::delete_paper),
        )
        .route("/papers/{id}/publish", post(papers::publish_paper))
        .route(
            "/papers/{id}/story",
            get(stories::get_story).put(stories::set_story),
        )
        // Citations
        .route("/papers/{id}/cite", get(citations::cite))
        .route("/papers/{id}/citations", get(citations::all_citations))
        // Discussion
        .route(
            "/papers/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/comments/{id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route(
            "/papers/{id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        // Bookmarks
        .route(
            "/papers/{id}/bookmark",
            put(bookmarks::add_bookmark).delete(bookmarks::remove_bookmark),
        )
        .route("/bookmarks", get(bookmarks::list_bookmarks))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        // Authorship claims
        .route("/claims/potential", get(claims::potential_claims))
        .route("/papers/{id}/claim", post(claims::claim_paper));

    if rate_limited {
        api_routes = api_routes.layer(from_fn_with_state(
            state.limiters.api.clone(),
            rate_limit_middleware,
        ));
    }

    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(health::metrics))
        .nest("/api", api_routes)
        .layer(from_fn(middleware::metrics::track_requests))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.server.cors_origins))
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}
