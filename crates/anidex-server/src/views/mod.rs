//! Server-side HTML rendering.
//!
//! Pages are assembled with `format!`; every interpolated value goes through
//! [`esc`] and every URL component built from catalog data through
//! [`encode_segment`].

pub mod catalog;
pub mod forms;
pub mod info;

use anidex_core::config::SiteConfig;
use axum::response::Html;
use chrono::Datelike;

use crate::flash::Flash;

pub const DEFAULT_SITE_NAME: &str = "Anidex";

/// HTML-escape text for element content or a double-quoted attribute.
pub fn esc(s: &str) -> String {
    htmlescape::encode_minimal(s)
}

/// Percent-encode one path segment or query value, `/` included.
pub fn encode_segment(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// Link to a title's player page, optionally selecting an episode.
pub fn stream_href(title: &str, episode: Option<&str>) -> String {
    match episode {
        Some(ep) => format!("/stream/{}?ep={}", encode_segment(title), encode_segment(ep)),
        None => format!("/stream/{}", encode_segment(title)),
    }
}

/// Percent-encode each segment of an absolute site path.
pub fn asset_href(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Shared page chrome.
pub struct Layout<'a> {
    site: &'a SiteConfig,
    flash: Option<&'a Flash>,
    year: i32,
}

impl<'a> Layout<'a> {
    pub fn new(site: &'a SiteConfig) -> Self {
        Self {
            site,
            flash: None,
            year: chrono::Utc::now().year(),
        }
    }

    pub fn with_flash(mut self, flash: Option<&'a Flash>) -> Self {
        self.flash = flash;
        self
    }

    pub fn site(&self) -> &SiteConfig {
        self.site
    }

    pub fn site_name(&self) -> &str {
        self.site
            .site_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_SITE_NAME)
    }

    pub fn render(&self, title: &str, body: &str) -> Html<String> {
        let site_name = esc(self.site_name());
        let page_title = if title.is_empty() {
            site_name.clone()
        } else {
            format!("{} | {site_name}", esc(title))
        };

        Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{page_title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header class="site-header">
<a class="brand" href="/">{site_name}</a>
<nav>
<a href="/">Home</a>
<a href="/animes">Animes</a>
<a href="/request">Request</a>
<a href="/feedback">Feedback</a>
</nav>
</header>
<main>
{flash}{body}
</main>
{footer}
</body>
</html>
"#,
            flash = self.flash_html(),
            footer = self.footer_html(),
        ))
    }

    fn flash_html(&self) -> String {
        match self.flash {
            Some(flash) => format!(
                "<div class=\"flash flash-{}\" role=\"status\">{}</div>\n",
                flash.category.as_str(),
                esc(&flash.message)
            ),
            None => String::new(),
        }
    }

    fn footer_html(&self) -> String {
        let mut links = vec![
            r#"<a href="/dmca">DMCA</a>"#.to_string(),
            r#"<a href="/privacy">Privacy</a>"#.to_string(),
            r#"<a href="/terms">Terms</a>"#.to_string(),
            r#"<a href="/support">Support</a>"#.to_string(),
        ];
        if let Some(email) = self.site.email.as_deref().filter(|e| !e.is_empty()) {
            links.push(format!(
                r#"<a href="mailto:{0}">{0}</a>"#,
                esc(email)
            ));
        }
        if let Some(user) = self.site.telegram_user.as_deref().filter(|u| !u.is_empty()) {
            links.push(format!(
                r#"<a href="https://t.me/{}">Telegram</a>"#,
                encode_segment(user.trim_start_matches('@'))
            ));
        }

        format!(
            "<footer class=\"site-footer\">\n<p>&copy; {} {}</p>\n<p>{}</p>\n</footer>",
            self.year,
            esc(self.site_name()),
            links.join(" | ")
        )
    }
}
