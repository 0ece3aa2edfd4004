//! `Cache-Control` decoration for every response.

use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Every cover extension the resolver looks for, plus favicon formats.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "ico", "svg", "webp", "avif"];
const SCRIPT_EXTENSIONS: &[&str] = &["css", "js"];

pub const IMAGE_POLICY: &str = "public, max-age=86400";
pub const SCRIPT_POLICY: &str = "public, max-age=3600";
pub const DEFAULT_POLICY: &str = "no-store";

/// Cache directive for a request path.
pub fn policy_for(path: &str) -> &'static str {
    let Some(asset) = path.strip_prefix("/static/") else {
        return DEFAULT_POLICY;
    };
    let ext = asset
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        IMAGE_POLICY
    } else if SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
        SCRIPT_POLICY
    } else {
        DEFAULT_POLICY
    }
}

pub async fn cache_control_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let policy = policy_for(request.uri().path());
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(policy));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_cache_for_a_day() {
        assert_eq!(policy_for("/static/covers/Frieren.jpg"), IMAGE_POLICY);
        assert_eq!(policy_for("/static/placeholder.svg"), IMAGE_POLICY);
        assert_eq!(policy_for("/static/favicon.ICO"), IMAGE_POLICY);
        assert_eq!(policy_for("/static/covers/x.webp"), IMAGE_POLICY);
        assert_eq!(policy_for("/static/covers/Mob Psycho.avif"), IMAGE_POLICY);
    }

    #[test]
    fn every_cover_extension_is_an_image() {
        for ext in anidex_core::cover::COVER_EXTENSIONS {
            let path = format!("/static/covers/Frieren{ext}");
            assert_eq!(policy_for(&path), IMAGE_POLICY, "{path}");
        }
    }

    #[test]
    fn scripts_and_styles_cache_for_an_hour() {
        assert_eq!(policy_for("/static/style.css"), SCRIPT_POLICY);
        assert_eq!(policy_for("/static/search.js"), SCRIPT_POLICY);
    }

    #[test]
    fn everything_else_is_uncached() {
        assert_eq!(policy_for("/"), DEFAULT_POLICY);
        assert_eq!(policy_for("/animes"), DEFAULT_POLICY);
        assert_eq!(policy_for("/stream/logo.png"), DEFAULT_POLICY);
        assert_eq!(policy_for("/static/README"), DEFAULT_POLICY);
    }
}
