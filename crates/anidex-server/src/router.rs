//! Axum router construction.
//!
//! Builds the full application router with all page routes, static file
//! serving, the 404 fallback, and the middleware stack.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::cache_control::cache_control_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Build the application router.
pub fn build_router(ctx: AppContext) -> Router {
    let static_dir = ctx.config.server.static_dir.clone();

    Router::new()
        .route("/", get(routes::catalog::home))
        .route("/animes", get(routes::catalog::animes))
        .route("/stream/{*name}", get(routes::catalog::stream))
        .route(
            "/request",
            get(routes::intake::request_form).post(routes::intake::submit_request),
        )
        .route(
            "/feedback",
            get(routes::intake::feedback_form).post(routes::intake::submit_feedback),
        )
        .route("/dmca", get(routes::info::dmca))
        .route("/privacy", get(routes::info::privacy))
        .route("/terms", get(routes::info::terms))
        .route("/support", get(routes::info::support))
        .route("/health", get(routes::info::health))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(routes::info::not_found)
        .layer(middleware::from_fn(cache_control_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
