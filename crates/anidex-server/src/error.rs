//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`anidex_core::Error`] so that route handlers
//! can return `Result<T, AppError>` directly. Errors render as HTML pages,
//! never as raw bodies.

use anidex_core::config::SiteConfig;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::views::{self, Layout};

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: anidex_core::Error,
    site: SiteConfig,
}

impl AppError {
    pub fn new(inner: anidex_core::Error) -> Self {
        Self {
            inner,
            site: SiteConfig::default(),
        }
    }

    /// Render the error page with the site's branding.
    pub fn with_site(mut self, site: &SiteConfig) -> Self {
        self.site = site.clone();
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<anidex_core::Error> for AppError {
    fn from(e: anidex_core::Error) -> Self {
        Self::new(e)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::new(anidex_core::Error::Internal(format!("blocking task failed: {e}")))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let layout = Layout::new(&self.site);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in handler"
            );
            return (status, views::info::server_error(&layout)).into_response();
        }

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(error = %self.inner, "not found");
            return (status, views::info::not_found(&layout)).into_response();
        }

        (status, views::info::bad_request(&layout, &self.inner.to_string())).into_response()
    }
}
