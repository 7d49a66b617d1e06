//! Notification delivery for consultation bookings.
//!
//! This crate provides the building blocks for outbound customer and
//! business emails:
//!
//! - [`NotificationRequest`] — one outbound message (booking, confirmation,
//!   contact form, newsletter confirmation).
//! - [`delivery`] — the channels a request can travel over (transactional
//!   email provider, confirmation HTTP backend, SMTP relay).
//! - [`NotificationDispatcher`] — tries the channels for a request in order
//!   and escalates to a [`UserNotifier`] when a user-facing message fails.

pub mod delivery;
pub mod dispatcher;
pub mod notifier;
pub mod request;

pub use delivery::backend::{BackendConfig, EmailBackend, HttpEmailBackend};
pub use delivery::emailjs::{DisabledEmailProvider, EmailJsClient, EmailJsConfig, EmailProvider};
pub use delivery::smtp::{SmtpConfig, SmtpMailer};
pub use dispatcher::{DispatcherConfig, NotificationDispatcher, TemplateIds};
pub use notifier::{RecordingNotifier, TracingNotifier, UserNotifier};
pub use request::{
    ContactMessage, DeliveryChannel, DeliveryOutcome, NotificationKind, NotificationRequest,
    Recipient, TemplateFields,
};
