//! Handlers for the contact form and newsletter sign-up.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use consult_notify::{ContactMessage, NotificationRequest, RecordingNotifier};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, WithAlerts};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body for `POST /contact`.
#[derive(Debug, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

/// Blank optional inputs are treated as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ContactForm> for ContactMessage {
    fn from(form: ContactForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            phone: non_blank(form.phone),
            company: non_blank(form.company),
            subject: non_blank(form.subject),
            message: form.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactSent {
    pub sent: bool,
}

/// Body for `POST /newsletter`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewsletterForm {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct Subscribed {
    pub subscribed: bool,
    /// Message returned by the email backend.
    pub message: String,
    pub confirmation_sent: bool,
}

// ---------------------------------------------------------------------------
// POST /contact
// ---------------------------------------------------------------------------

/// Forward a contact-form message to the business inbox.
///
/// Delivery failure is reported through `alerts`, not the status code.
pub async fn send_contact_message(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> AppResult<Json<DataResponse<WithAlerts<ContactSent>>>> {
    form.validate()?;

    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = state.dispatcher.with_notifier(notifier.clone());

    let message = ContactMessage::from(form);
    let request = NotificationRequest::contact_form(dispatcher.admin_email(), &message);
    let outcome = dispatcher.dispatch(&request).await;

    Ok(Json(DataResponse {
        data: WithAlerts {
            result: ContactSent {
                sent: outcome.succeeded,
            },
            alerts: notifier.take(),
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /newsletter
// ---------------------------------------------------------------------------

/// Subscribe an address at the email backend, then send the welcome email.
///
/// Only the subscription itself can fail the request.
pub async fn subscribe_newsletter(
    State(state): State<AppState>,
    Json(form): Json<NewsletterForm>,
) -> AppResult<Json<DataResponse<Subscribed>>> {
    form.validate()?;

    let response = state
        .backend
        .subscribe_newsletter(&form.email)
        .await
        .map_err(|e| {
            tracing::warn!(email = %form.email, error = %e, "Newsletter subscription failed");
            AppError::BadGateway(
                "Newsletter subscription failed. Please try again later.".to_string(),
            )
        })?;

    let request = NotificationRequest::newsletter_confirmation(&form.email);
    let outcome = state.dispatcher.dispatch(&request).await;

    tracing::info!(
        email = %form.email,
        confirmation_sent = outcome.succeeded,
        "Newsletter subscription recorded"
    );

    Ok(Json(DataResponse {
        data: Subscribed {
            subscribed: true,
            message: response.message,
            confirmation_sent: outcome.succeeded,
        },
    }))
}
