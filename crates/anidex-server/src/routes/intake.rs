//! Request and feedback form handlers.
//!
//! GET renders the form with a fresh challenge and consumes any pending
//! flash. POST runs the submission through [`IntakeService`] and always
//! answers with a `303` back to the form carrying the outcome as a flash.
//!
//! [`IntakeService`]: anidex_core::IntakeService

use anidex_core::intake::Outcome;
use anidex_core::{IntakeForm, IntakeKind};
use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;

use crate::client_ip::ClientIp;
use crate::context::AppContext;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::views::forms::form_path;
use crate::views::{self, Layout};

/// Posted fields of either form.
#[derive(Debug, Default, Deserialize)]
pub struct IntakeFields {
    pub title: Option<String>,
    pub feedback: Option<String>,
    pub altcha: Option<String>,
}

impl IntakeFields {
    fn into_form(self, kind: IntakeKind) -> IntakeForm {
        let text = match kind {
            IntakeKind::Request => self.title,
            IntakeKind::Feedback => self.feedback,
        };
        IntakeForm {
            text,
            altcha: self.altcha,
        }
    }
}

/// GET /request
pub async fn request_form(
    State(ctx): State<AppContext>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    render_form(&ctx, jar, IntakeKind::Request)
}

/// POST /request
pub async fn submit_request(
    State(ctx): State<AppContext>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    Form(fields): Form<IntakeFields>,
) -> Result<(CookieJar, Redirect), AppError> {
    submit(ctx, jar, ip, IntakeKind::Request, fields).await
}

/// GET /feedback
pub async fn feedback_form(
    State(ctx): State<AppContext>,
    jar: CookieJar,
) -> (CookieJar, Html<String>) {
    render_form(&ctx, jar, IntakeKind::Feedback)
}

/// POST /feedback
pub async fn submit_feedback(
    State(ctx): State<AppContext>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    Form(fields): Form<IntakeFields>,
) -> Result<(CookieJar, Redirect), AppError> {
    submit(ctx, jar, ip, IntakeKind::Feedback, fields).await
}

fn render_form(ctx: &AppContext, jar: CookieJar, kind: IntakeKind) -> (CookieJar, Html<String>) {
    let (jar, pending) = flash::take(jar, ctx.session_key());

    let challenge = match ctx.intake.challenge(Utc::now()) {
        Ok(challenge) => Some(challenge),
        Err(e) => {
            tracing::warn!(%kind, "failed to create captcha challenge: {e}");
            None
        }
    };

    let layout = Layout::new(ctx.site()).with_flash(pending.as_ref());
    let page = views::forms::form(&layout, kind, challenge.as_ref());
    (jar, page)
}

async fn submit(
    ctx: AppContext,
    jar: CookieJar,
    ip: String,
    kind: IntakeKind,
    fields: IntakeFields,
) -> Result<(CookieJar, Redirect), AppError> {
    let form = fields.into_form(kind);
    let intake = ctx.intake.clone();

    let outcome = tokio::task::spawn_blocking(move || intake.submit(kind, &ip, &form, Utc::now()))
        .await
        .map_err(|e| AppError::from(e).with_site(ctx.site()))?
        .map_err(|e| AppError::from(e).with_site(ctx.site()))?;

    let message = match outcome {
        Outcome::Accepted { .. } => Flash::success(kind.success_message()),
        Outcome::Rejected(rejection) => Flash::error(rejection.to_string()),
    };

    let jar = flash::set(jar, ctx.session_key(), &message);
    Ok((jar, Redirect::to(form_path(kind))))
}
