//! Shared test harness for integration tests.
//!
//! [`TestHarness`] lays out a temporary data and static directory, seeds the
//! catalog, and drives the full router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::path::PathBuf;

use anidex_core::captcha;
use anidex_core::{Config, IntakeKind};
use anidex_server::context::AppContext;
use anidex_server::flash;
use anidex_server::router::build_router;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SESSION_KEY: &str = "test-session-key";
pub const CAPTCHA_KEY: &str = "test-captcha-key";

pub const SAMPLE_CATALOG: &str = r#"{
  "Frieren": {
    "year": 2023,
    "description": "An elf mage outlives her party.",
    "content": {"1": "https://player.example/frieren/1", "2": "https://player.example/frieren/2"}
  },
  "Oshi no Ko": {"year": 2023, "content": {"1": "https://player.example/oshi/1"}},
  "Bocchi the Rock!": {"year": 2022, "content": {"1": "https://player.example/bocchi/1"}},
  "Spy x Family": {"year": 2022, "content": {"1": "https://player.example/spy/1"}},
  "Empty Show": {"year": 2020, "content": {}},
  "Mob Psycho 100": {"year": 2016, "content": {"1": "https://player.example/mob/1"}},
  "Fate/Zero": {"year": 2011, "content": {"1": "https://player.example/fate/1"}},
  "Cowboy Bebop": {"year": 1998, "content": {"Session 1": "https://player.example/bebop/1"}}
}"#;

pub struct TestHarness {
    pub dir: TempDir,
    pub ctx: AppContext,
    pub app: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.header(header::LOCATION.as_str())
    }

    /// The `name=value` pair of the flash cookie, if one was set.
    pub fn flash_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| v.starts_with(flash::COOKIE_NAME))
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
            .find(|pair| pair.len() > flash::COOKIE_NAME.len() + 1)
    }

    /// Decoded flash message carried by this response.
    pub fn flash(&self) -> Option<flash::Flash> {
        let pair = self.flash_cookie()?;
        let (_, value) = pair.split_once('=')?;
        flash::decode(value, SESSION_KEY.as_bytes())
    }

    /// Position of `needle` in the body, panicking when absent.
    pub fn position(&self, needle: &str) -> usize {
        self.body
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not found in body"))
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Harness with the sample catalog and a tweaked configuration.
    pub fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let data_dir = dir.path().join("data");
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::create_dir_all(static_dir.join("covers")).unwrap();

        std::fs::write(data_dir.join("animes.json"), SAMPLE_CATALOG).unwrap();
        std::fs::write(static_dir.join("style.css"), "body { margin: 0; }").unwrap();
        std::fs::write(static_dir.join("search.js"), "// search").unwrap();
        std::fs::write(static_dir.join("placeholder.svg"), "<svg/>").unwrap();
        std::fs::write(static_dir.join("covers").join("Frieren.jpg"), b"jpg").unwrap();

        let mut config = Config::default();
        config.server.data_dir = data_dir;
        config.server.static_dir = static_dir;
        config.secrets.session_key = Some(SESSION_KEY.into());
        config.secrets.captcha_key = Some(CAPTCHA_KEY.into());
        config.site.site_name = Some("AniTest".into());
        config.site.email = Some("contact@anitest.example".into());
        config.site.telegram_user = Some("anitest".into());
        config.captcha.max_number = 2_000;
        tweak(&mut config);

        let ctx = AppContext::new(config);
        let app = build_router(ctx.clone());
        Self { dir, ctx, app }
    }

    pub fn data_path(&self, file: &str) -> PathBuf {
        self.ctx.config.server.data_dir.join(file)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// POST url-encoded `fields` as the client at `ip`.
    pub async fn post_form(&self, uri: &str, ip: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .header("x-forwarded-for", ip)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// A solution payload the server will accept, produced the way the widget does.
    pub fn solved_altcha(&self) -> String {
        let challenge = self.ctx.intake.challenge(chrono::Utc::now()).unwrap();
        captcha::solve(&challenge)
            .expect("solution within maxnumber")
            .encode()
    }

    /// Submit one form with a valid CAPTCHA.
    pub async fn submit(&self, kind: IntakeKind, ip: &str, text: &str) -> TestResponse {
        let altcha = self.solved_altcha();
        let (path, field) = match kind {
            IntakeKind::Request => ("/request", "title"),
            IntakeKind::Feedback => ("/feedback", "feedback"),
        };
        self.post_form(path, ip, &[(field, text), ("altcha", &altcha)])
            .await
    }

    /// Records currently persisted for `kind` (empty when the file is absent).
    pub fn records(&self, kind: IntakeKind) -> Vec<Value> {
        let path = match kind {
            IntakeKind::Request => self.data_path("requests.json"),
            IntakeKind::Feedback => self.data_path("feedbacks.json"),
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).expect("records must stay valid JSON"),
            Err(_) => Vec::new(),
        }
    }
}
