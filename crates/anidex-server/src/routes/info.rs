//! Informational pages, health check, and the 404 fallback.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use crate::context::AppContext;
use crate::views::{self, Layout};

/// GET /dmca
pub async fn dmca(State(ctx): State<AppContext>) -> Html<String> {
    views::info::dmca(&Layout::new(ctx.site()))
}

/// GET /privacy
pub async fn privacy(State(ctx): State<AppContext>) -> Html<String> {
    views::info::privacy(&Layout::new(ctx.site()))
}

/// GET /terms
pub async fn terms(State(ctx): State<AppContext>) -> Html<String> {
    views::info::terms(&Layout::new(ctx.site()))
}

/// GET /support
pub async fn support(State(ctx): State<AppContext>) -> Html<String> {
    views::info::support(&Layout::new(ctx.site()))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// Fallback for every unmatched path.
pub async fn not_found(State(ctx): State<AppContext>) -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, views::info::not_found(&Layout::new(ctx.site())))
}
