use std::sync::Arc;

use consult_notify::{EmailBackend, NotificationDispatcher, SmtpMailer};

use crate::config::ServerConfig;
use crate::wizard::WizardSessions;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live booking wizard sessions.
    pub sessions: Arc<WizardSessions>,
    /// Notification dispatcher; handlers derive a per-request copy with
    /// [`NotificationDispatcher::with_notifier`].
    pub dispatcher: NotificationDispatcher,
    /// Confirmation/newsletter backend, used directly for subscriptions.
    pub backend: Arc<dyn EmailBackend>,
    /// SMTP relay for the `/email/*` endpoints; `None` when not configured.
    pub mailer: Option<Arc<SmtpMailer>>,
}
