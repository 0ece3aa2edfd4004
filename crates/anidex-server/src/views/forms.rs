//! Request and feedback forms.

use anidex_core::captcha::Challenge;
use anidex_core::IntakeKind;
use axum::response::Html;

use super::{esc, Layout};

const WIDGET_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/altcha/dist/altcha.min.js";

pub fn form_path(kind: IntakeKind) -> &'static str {
    match kind {
        IntakeKind::Request => "/request",
        IntakeKind::Feedback => "/feedback",
    }
}

fn widget(challenge: Option<&Challenge>) -> String {
    let Some(challenge) = challenge else {
        return r#"<p class="notice">Security verification is temporarily unavailable. Please try again later.</p>"#
            .to_string();
    };
    match serde_json::to_string(challenge) {
        Ok(json) => format!(
            "<altcha-widget challengejson=\"{}\"></altcha-widget>\n<script async defer type=\"module\" src=\"{WIDGET_SCRIPT}\"></script>",
            esc(&json)
        ),
        Err(e) => {
            tracing::warn!("failed to serialize challenge: {e}");
            String::new()
        }
    }
}

pub fn form(layout: &Layout<'_>, kind: IntakeKind, challenge: Option<&Challenge>) -> Html<String> {
    let (heading, intro, input) = match kind {
        IntakeKind::Request => (
            "Request an anime",
            "Missing a title? Tell us which one and we will look into adding it.",
            format!(
                r#"<label for="title">Anime name</label>
<input id="title" name="title" type="text" maxlength="{}" required>"#,
                kind.max_chars()
            ),
        ),
        IntakeKind::Feedback => (
            "Send feedback",
            "Found a broken episode or have a suggestion? Let us know.",
            format!(
                r#"<label for="feedback">Your feedback</label>
<textarea id="feedback" name="feedback" rows="6" minlength="{}" maxlength="{}" required></textarea>"#,
                kind.min_chars(),
                kind.max_chars()
            ),
        ),
    };

    let body = format!(
        r#"<h1>{heading}</h1>
<p>{intro}</p>
<form class="intake" method="post" action="{action}">
{input}
{widget}
<button type="submit">Submit</button>
</form>"#,
        action = form_path(kind),
        widget = widget(challenge),
    );
    layout.render(heading, &body)
}
