//! Informational pages and error pages.

use axum::response::Html;

use super::{esc, Layout};

fn contact(layout: &Layout<'_>) -> String {
    let site = layout.site();
    let mut lines = Vec::new();
    if let Some(email) = site.email.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!(r#"Email: <a href="mailto:{0}">{0}</a>"#, esc(email)));
    }
    if let Some(user) = site.telegram_user.as_deref().filter(|u| !u.is_empty()) {
        let handle = user.trim_start_matches('@');
        lines.push(format!(
            r#"Telegram: <a href="https://t.me/{0}">@{0}</a>"#,
            esc(handle)
        ));
    }
    if lines.is_empty() {
        return "<p>Use the <a href=\"/feedback\">feedback form</a> to reach us.</p>".to_string();
    }
    format!("<p>{}</p>", lines.join("<br>\n"))
}

pub fn dmca(layout: &Layout<'_>) -> Html<String> {
    let site = esc(layout.site_name());
    let body = format!(
        r#"<h1>DMCA</h1>
<p>{site} does not host any video files. Every episode is embedded from a third-party provider.</p>
<p>If you believe content linked here infringes your copyright, send a notice identifying the work, the page on {site} where it appears, and your contact details. We remove reported links promptly.</p>
{contact}"#,
        contact = contact(layout),
    );
    layout.render("DMCA", &body)
}

pub fn privacy(layout: &Layout<'_>) -> Html<String> {
    let site = esc(layout.site_name());
    let body = format!(
        r#"<h1>Privacy Policy</h1>
<p>{site} stores the text you submit through the request and feedback forms together with your IP address and the time of submission. This is used to process your submission and to limit abuse.</p>
<p>A short-lived cookie carries status messages between pages. No tracking or advertising cookies are set by {site}.</p>
<p>Embedded players are served by third parties and are subject to their own policies.</p>
{contact}"#,
        contact = contact(layout),
    );
    layout.render("Privacy Policy", &body)
}

pub fn terms(layout: &Layout<'_>) -> Html<String> {
    let site = esc(layout.site_name());
    let body = format!(
        r#"<h1>Terms of Service</h1>
<p>By using {site} you agree to use it for personal, non-commercial purposes only.</p>
<p>{site} is provided as is, without any warranty. Availability of titles and episodes may change at any time.</p>
<p>Automated submissions and attempts to circumvent the submission limits are not allowed.</p>"#
    );
    layout.render("Terms of Service", &body)
}

pub fn support(layout: &Layout<'_>) -> Html<String> {
    let site = esc(layout.site_name());
    let body = format!(
        r#"<h1>Support</h1>
<p>Having trouble with {site}? Check that the episode plays in another browser first, then get in touch.</p>
{contact}
<p>You can also <a href="/request">request a title</a> or <a href="/feedback">send feedback</a>.</p>"#,
        contact = contact(layout),
    );
    layout.render("Support", &body)
}

pub fn not_found(layout: &Layout<'_>) -> Html<String> {
    layout.render(
        "Page not found",
        r#"<h1>Page not found</h1>
<p>The page you are looking for does not exist.</p>
<p><a href="/">Back to home</a></p>"#,
    )
}

pub fn bad_request(layout: &Layout<'_>, message: &str) -> Html<String> {
    let body = format!(
        "<h1>Bad request</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to home</a></p>",
        esc(message)
    );
    layout.render("Bad request", &body)
}

pub fn server_error(layout: &Layout<'_>) -> Html<String> {
    layout.render(
        "Something went wrong",
        r#"<h1>Something went wrong</h1>
<p>Please try again in a moment.</p>"#,
    )
}
