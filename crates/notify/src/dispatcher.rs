//! Ordered channel fallback for notification requests.
//!
//! [`NotificationDispatcher`] delivers a [`NotificationRequest`] through the
//! channels configured for its kind, in order, stopping at the first
//! success:
//!
//! | Kind                      | Channels                                   | On total failure        |
//! |---------------------------|--------------------------------------------|-------------------------|
//! | `consultation_booking`    | email provider (admin)                     | user alert + `mailto:`  |
//! | `confirmation`            | HTTP backend, then email provider          | logged only             |
//! | `contact_form`            | email provider (admin)                     | user alert              |
//! | `newsletter_confirmation` | email provider                             | logged only             |
//!
//! A delivered booking spawns the customer confirmation as a detached task
//! whose outcome never affects the booking's own outcome. Every channel is
//! attempted at most once per dispatch.

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::delivery::backend::EmailBackend;
use crate::delivery::emailjs::{EmailProvider, EmailProviderError};
use crate::notifier::UserNotifier;
use crate::request::{
    DeliveryChannel, DeliveryOutcome, NotificationKind, NotificationRequest, TemplateFields,
    FIELD_MESSAGE, FIELD_SUBJECT,
};

/// Default business inbox for bookings and contact-form messages.
const DEFAULT_ADMIN_EMAIL: &str = "hello@consultpro.example";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Email provider template identifiers, one per notification kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateIds {
    pub booking: String,
    pub confirmation: String,
    pub contact: String,
    pub newsletter: String,
}

impl Default for TemplateIds {
    fn default() -> Self {
        Self {
            booking: "template_booking".to_string(),
            confirmation: "template_confirmation".to_string(),
            contact: "template_contact".to_string(),
            newsletter: "template_newsletter".to_string(),
        }
    }
}

impl TemplateIds {
    /// Load template identifiers from environment variables.
    ///
    /// | Variable                           | Default                 |
    /// |------------------------------------|-------------------------|
    /// | `EMAILJS_BOOKING_TEMPLATE_ID`      | `template_booking`      |
    /// | `EMAILJS_CONFIRMATION_TEMPLATE_ID` | `template_confirmation` |
    /// | `EMAILJS_CONTACT_TEMPLATE_ID`      | `template_contact`      |
    /// | `EMAILJS_NEWSLETTER_TEMPLATE_ID`   | `template_newsletter`   |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| std::env::var(name).unwrap_or(default);
        Self {
            booking: var("EMAILJS_BOOKING_TEMPLATE_ID", defaults.booking),
            confirmation: var("EMAILJS_CONFIRMATION_TEMPLATE_ID", defaults.confirmation),
            contact: var("EMAILJS_CONTACT_TEMPLATE_ID", defaults.contact),
            newsletter: var("EMAILJS_NEWSLETTER_TEMPLATE_ID", defaults.newsletter),
        }
    }
}

/// Addresses and templates used by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Business inbox receiving bookings and contact-form messages.
    pub admin_email: String,
    /// Address quoted to users in failure alerts.
    pub contact_email: String,
    pub templates: TemplateIds,
}

impl DispatcherConfig {
    /// Configuration with the given admin address used for both roles and
    /// default template identifiers.
    pub fn new(admin_email: impl Into<String>) -> Self {
        let admin_email = admin_email.into();
        Self {
            contact_email: admin_email.clone(),
            admin_email,
            templates: TemplateIds::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable        | Default                      |
    /// |-----------------|------------------------------|
    /// | `ADMIN_EMAIL`   | `hello@consultpro.example`   |
    /// | `CONTACT_EMAIL` | value of `ADMIN_EMAIL`       |
    ///
    /// Template identifiers come from [`TemplateIds::from_env`].
    pub fn from_env() -> Self {
        let admin_email =
            std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
        let contact_email = std::env::var("CONTACT_EMAIL").unwrap_or_else(|_| admin_email.clone());
        Self {
            admin_email,
            contact_email,
            templates: TemplateIds::from_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// Alert messages
// ---------------------------------------------------------------------------

fn booking_failure_alert(contact_email: &str) -> String {
    format!(
        "Sorry, we couldn't send your booking request. \
         Please contact us directly at {contact_email} to schedule your consultation."
    )
}

fn contact_failure_alert(contact_email: &str) -> String {
    format!(
        "Sorry, we couldn't send your message. \
         Please email us directly at {contact_email}."
    )
}

fn failure_alert(kind: NotificationKind, contact_email: &str) -> String {
    match kind {
        NotificationKind::ConsultationBooking => booking_failure_alert(contact_email),
        _ => contact_failure_alert(contact_email),
    }
}

/// Last-resort `mailto:` link pre-filled with the request's subject and
/// message.
fn mailto_fallback(contact_email: &str, request: &NotificationRequest) -> String {
    let base = format!("mailto:{contact_email}");
    let pairs: Vec<(&str, &str)> = [
        ("subject", request.payload.get(FIELD_SUBJECT)),
        ("body", request.payload.get(FIELD_MESSAGE)),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key, v)))
    .collect();

    if pairs.is_empty() {
        return base;
    }
    let Ok(mut url) = reqwest::Url::parse(&base) else {
        return base;
    };
    url.query_pairs_mut().extend_pairs(pairs);
    url.to_string()
}

// ---------------------------------------------------------------------------
// NotificationDispatcher
// ---------------------------------------------------------------------------

/// Delivers notification requests over their kind's ordered channels.
///
/// Cheap to clone; clones share channels, configuration and the detached
/// task tracker.
#[derive(Clone)]
pub struct NotificationDispatcher {
    email: Arc<dyn EmailProvider>,
    backend: Arc<dyn EmailBackend>,
    notifier: Arc<dyn UserNotifier>,
    config: Arc<DispatcherConfig>,
    detached: TaskTracker,
}

impl NotificationDispatcher {
    pub fn new(
        email: Arc<dyn EmailProvider>,
        backend: Arc<dyn EmailBackend>,
        notifier: Arc<dyn UserNotifier>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            email,
            backend,
            notifier,
            config: Arc::new(config),
            detached: TaskTracker::new(),
        }
    }

    /// A dispatcher sharing this one's channels and task tracker but
    /// reporting alerts to `notifier`.
    pub fn with_notifier(&self, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            notifier,
            ..self.clone()
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn admin_email(&self) -> &str {
        &self.config.admin_email
    }

    /// Deliver `request`. Never fails; channel errors are logged and folded
    /// into the returned outcome.
    pub async fn dispatch(&self, request: &NotificationRequest) -> DeliveryOutcome {
        tracing::info!(
            kind = %request.kind,
            to = %request.recipient.email,
            "Dispatching notification"
        );

        let outcome = match request.kind {
            NotificationKind::ConsultationBooking => self.deliver_booking(request).await,
            NotificationKind::Confirmation => self.deliver_confirmation(request).await,
            NotificationKind::ContactForm => self.deliver_contact_form(request).await,
            NotificationKind::NewsletterConfirmation => {
                self.deliver_newsletter_confirmation(request).await
            }
        };

        tracing::info!(
            kind = %request.kind,
            channel = outcome.attempted_channel.as_str(),
            succeeded = outcome.succeeded,
            "Dispatch finished"
        );

        if !outcome.succeeded && request.kind.alerts_on_failure() {
            self.notifier
                .notify(&failure_alert(request.kind, &self.config.contact_email));
        }
        outcome
    }

    /// Wait for every detached confirmation spawned so far to finish.
    pub async fn drain_detached(&self) {
        self.detached.close();
        self.detached.wait().await;
        self.detached.reopen();
    }

    /// Number of detached confirmations still running.
    pub fn detached_in_flight(&self) -> usize {
        self.detached.len()
    }

    // -- per-kind delivery --------------------------------------------------

    async fn deliver_booking(&self, request: &NotificationRequest) -> DeliveryOutcome {
        let channel = DeliveryChannel::EmailProvider;

        match self
            .send_email(request, &self.config.templates.booking, &request.payload)
            .await
        {
            Ok(()) => {
                match request.follow_up_confirmation() {
                    Some(confirmation) => self.spawn_confirmation(confirmation),
                    None => tracing::warn!("Booking payload has no customer address, confirmation skipped"),
                }
                DeliveryOutcome::delivered(channel)
            }
            Err(e) => {
                let link = mailto_fallback(&self.config.contact_email, request);
                tracing::error!(
                    error = %e,
                    fallback = %link,
                    "Booking email failed, falling back to direct contact"
                );
                DeliveryOutcome::failed(channel, e.to_string()).with_fallback_link(link)
            }
        }
    }

    async fn deliver_confirmation(&self, request: &NotificationRequest) -> DeliveryOutcome {
        let email = request.recipient.email.as_str();
        let name = request.recipient.name.as_deref().unwrap_or_default();

        tracing::debug!(to = email, channel = DeliveryChannel::HttpBackend.as_str(), "Attempting channel");
        match self.backend.send_confirmation(email, name).await {
            Ok(response) => {
                tracing::info!(to = email, message = %response.message, "Confirmation sent via backend");
                return DeliveryOutcome::delivered(DeliveryChannel::HttpBackend);
            }
            Err(e) => {
                tracing::warn!(
                    to = email,
                    error = %e,
                    "Confirmation backend failed, trying email provider"
                );
            }
        }

        let fields = request.confirmation_fallback_fields();
        match self
            .send_email(request, &self.config.templates.confirmation, &fields)
            .await
        {
            Ok(()) => DeliveryOutcome::delivered(DeliveryChannel::EmailProvider),
            Err(e) => {
                tracing::error!(to = email, error = %e, "All confirmation channels failed, giving up");
                DeliveryOutcome::failed(DeliveryChannel::EmailProvider, e.to_string())
            }
        }
    }

    async fn deliver_contact_form(&self, request: &NotificationRequest) -> DeliveryOutcome {
        let channel = DeliveryChannel::EmailProvider;

        match self
            .send_email(request, &self.config.templates.contact, &request.payload)
            .await
        {
            Ok(()) => DeliveryOutcome::delivered(channel),
            Err(e) => {
                tracing::warn!(error = %e, "Contact form email failed");
                DeliveryOutcome::failed(channel, e.to_string())
            }
        }
    }

    async fn deliver_newsletter_confirmation(
        &self,
        request: &NotificationRequest,
    ) -> DeliveryOutcome {
        let channel = DeliveryChannel::EmailProvider;

        match self
            .send_email(request, &self.config.templates.newsletter, &request.payload)
            .await
        {
            Ok(()) => DeliveryOutcome::delivered(channel),
            Err(e) => {
                tracing::warn!(
                    to = %request.recipient.email,
                    error = %e,
                    "Newsletter confirmation email failed"
                );
                DeliveryOutcome::failed(channel, e.to_string())
            }
        }
    }

    // -- helpers ------------------------------------------------------------

    /// Run the customer confirmation on the tracker without awaiting it.
    fn spawn_confirmation(&self, request: NotificationRequest) {
        let this = self.clone();
        self.detached.spawn(async move {
            let outcome = this.deliver_confirmation(&request).await;
            if outcome.succeeded {
                tracing::info!(
                    to = %request.recipient.email,
                    channel = outcome.attempted_channel.as_str(),
                    "Detached confirmation delivered"
                );
            } else {
                tracing::warn!(
                    to = %request.recipient.email,
                    error = outcome.error_detail.as_deref().unwrap_or_default(),
                    "Detached confirmation not delivered"
                );
            }
        });
    }

    /// One email provider attempt, logged.
    async fn send_email(
        &self,
        request: &NotificationRequest,
        template_id: &str,
        fields: &TemplateFields,
    ) -> Result<(), EmailProviderError> {
        tracing::debug!(
            kind = %request.kind,
            template_id,
            channel = DeliveryChannel::EmailProvider.as_str(),
            "Attempting channel"
        );

        match self.email.send(template_id, fields).await {
            Ok(result) => {
                tracing::info!(
                    kind = %request.kind,
                    to = %request.recipient.email,
                    status = result.status,
                    "Email provider send succeeded"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    kind = %request.kind,
                    to = %request.recipient.email,
                    error = %e,
                    "Email provider send failed"
                );
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
