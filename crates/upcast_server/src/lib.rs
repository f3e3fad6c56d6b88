//! HTTP server wiring for Upcast (API, handlers, and shared state).

/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers grouped by resource.
pub mod handlers;
/// Post-commit notification dispatch and push delivery.
pub mod notifier;

pub use notifier::SpawnedNotifier;
pub use upcast_core::{config, db, models, AppError, Config, Database, DEFAULT_PORT};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; img-src 'self' data: https:; frame-ancestors 'none'; base-uri 'self'; form-action 'self'";

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    /// Outbound client for push delivery.
    pub http: reqwest::Client,
}

impl AppState {
    /// Construct shared application state.
    ///
    /// # Arguments
    /// - `config`: Loaded configuration.
    /// - `db`: Open database handle.
    ///
    /// # Returns
    /// A new [`AppState`].
    pub fn new(config: Config, db: Database) -> Self {
        let http = notifier::push_client(&config);
        Self::with_client(config, db, http)
    }

    /// Construct shared application state with a pre-built push client.
    pub fn with_client(config: Config, db: Database, http: reqwest::Client) -> Self {
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            http,
        }
    }

    /// Post-commit hook bound to this state.
    pub fn notifier(&self) -> SpawnedNotifier {
        SpawnedNotifier::new(self.db.clone(), self.config.clone(), self.http.clone())
    }
}

/// Create the application router with all routes and middleware.
///
/// # Arguments
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
///
/// # Returns
/// Configured `axum::Router`.
pub fn create_app(state: AppState, allow_public_access: bool) -> Router {
    let cors_port = state.config.port;
    create_app_with_cors_port(state, allow_public_access, cors_port)
}

/// Resolve the listener address from env var overrides and security policy.
///
/// # Arguments
/// - `config`: Server configuration containing the configured `port`.
/// - `allow_public_access`: Whether non-loopback bind targets are permitted.
///
/// # Returns
/// A validated socket address that enforces loopback when public access is disabled.
pub fn resolve_bind_address(config: &Config, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

fn cors_layer(allow_public_access: bool, cors_port: u16) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if allow_public_access {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any);
    }

    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{}", cors_port),
        format!("http://127.0.0.1:{}", cors_port),
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

fn api_routes() -> Router<AppState> {
    use handlers::*;

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/users", post(users::upsert_user))
        .route("/api/users/fid/:fid", get(users::get_user_by_fid))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/saved", get(users::list_saved_projects))
        .route(
            "/api/users/:id/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/api/users/:id/notifications/unread",
            get(notifications::unread_count),
        )
        .route(
            "/api/users/:id/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            post(notifications::mark_read),
        )
        .route(
            "/api/categories",
            post(categories::create_category).get(categories::list_categories),
        )
        .route(
            "/api/categories/:id",
            get(categories::get_category).delete(categories::delete_category),
        )
        .route(
            "/api/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/api/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/projects/:id/upvote", post(votes::toggle_project_upvote))
        .route("/api/projects/:id/save", post(votes::toggle_project_save))
        .route(
            "/api/projects/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/api/comments/:id",
            axum::routing::delete(comments::delete_comment),
        )
        .route(
            "/api/creators",
            post(creators::create_creator).get(creators::list_creators),
        )
        .route("/api/creators/:id", get(creators::get_creator))
        .route("/api/creators/:id/upvote", post(votes::toggle_creator_upvote))
        .route("/api/webhook", post(webhook::handle_webhook))
}

fn create_app_with_cors_port(state: AppState, allow_public_access: bool, cors_port: u16) -> Router {
    let max_body_size = state.config.max_body_size;
    api_routes().with_state(state).layer(
        tower::ServiceBuilder::new()
            .layer(DefaultBodyLimit::max(max_body_size))
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors_layer(allow_public_access, cors_port))
            .layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(CONTENT_SECURITY_POLICY),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            )),
    )
}

fn listener_cors_port(listener: &tokio::net::TcpListener, fallback_port: u16) -> u16 {
    listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(fallback_port)
}

/// Run the Axum server with graceful shutdown support.
///
/// # Arguments
/// - `listener`: Bound TCP listener for the server.
/// - `state`: Shared application state.
/// - `allow_public_access`: Whether to allow cross-origin requests from any origin.
/// - `shutdown_signal`: Future that resolves when shutdown should start.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    allow_public_access: bool,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let cors_port = listener_cors_port(&listener, state.config.port);
    let app = create_app_with_cors_port(state, allow_public_access, cors_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
