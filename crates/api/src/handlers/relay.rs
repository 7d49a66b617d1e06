//! SMTP relay endpoints.
//!
//! These implement the email backend contract (`POST /email/confirmation`,
//! `POST /email/newsletter`, answering `{"message"}`) so this server can act
//! as its own confirmation backend when `SMTP_HOST` is configured.
//!
//! The subscriber's welcome email is the dispatcher's newsletter
//! confirmation; the newsletter relay only notifies the business inbox of
//! the new subscriber.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use validator::ValidateEmail;

use consult_notify::delivery::backend::{
    BackendResponse, ConfirmationEmailRequest, NewsletterEmailRequest,
};
use consult_notify::request::BUSINESS_NAME;
use consult_notify::SmtpMailer;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn confirmation_subject() -> String {
    format!("Your consultation with {BUSINESS_NAME} is confirmed")
}

fn confirmation_body(name: &str) -> String {
    let greeting = if name.trim().is_empty() {
        "Hello".to_string()
    } else {
        format!("Hi {name}")
    };
    format!(
        "{greeting},\n\n\
         Thank you for booking a consultation with {BUSINESS_NAME}. \
         We have received your request and will be in touch within 24 hours \
         to confirm the details.\n\n\
         The {BUSINESS_NAME} team"
    )
}

fn subscription_notice_subject() -> String {
    format!("New {BUSINESS_NAME} newsletter subscriber")
}

fn subscription_notice_body(subscriber: &str) -> String {
    format!("{subscriber} subscribed to the {BUSINESS_NAME} newsletter.")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_mailer(state: &AppState) -> AppResult<Arc<SmtpMailer>> {
    state
        .mailer
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("SMTP relay is not configured".to_string()))
}

fn require_email(email: &String) -> AppResult<()> {
    if !email.validate_email() {
        return Err(AppError::BadRequest(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

async fn relay(mailer: &SmtpMailer, to: &str, subject: &str, body: String) -> AppResult<()> {
    mailer.send(to, subject, body).await.map_err(|e| {
        tracing::error!(to, error = %e, "SMTP relay failed");
        AppError::BadGateway("Failed to send email".to_string())
    })
}

// ---------------------------------------------------------------------------
// POST /email/confirmation
// ---------------------------------------------------------------------------

pub async fn send_confirmation(
    State(state): State<AppState>,
    Json(body): Json<ConfirmationEmailRequest>,
) -> AppResult<Json<BackendResponse>> {
    require_email(&body.email)?;
    let mailer = require_mailer(&state)?;

    relay(
        &mailer,
        &body.email,
        &confirmation_subject(),
        confirmation_body(&body.name),
    )
    .await?;

    Ok(Json(BackendResponse {
        message: "Confirmation email sent".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// POST /email/newsletter
// ---------------------------------------------------------------------------

pub async fn record_newsletter_subscription(
    State(state): State<AppState>,
    Json(body): Json<NewsletterEmailRequest>,
) -> AppResult<Json<BackendResponse>> {
    require_email(&body.email)?;
    let mailer = require_mailer(&state)?;

    relay(
        &mailer,
        state.dispatcher.admin_email(),
        &subscription_notice_subject(),
        subscription_notice_body(&body.email),
    )
    .await?;
    tracing::info!(email = %body.email, "Newsletter subscription recorded");

    Ok(Json(BackendResponse {
        message: "Newsletter subscription confirmed".to_string(),
    }))
}
