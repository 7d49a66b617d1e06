//! Channel ordering and fallback behaviour of the notification dispatcher.

mod common;

use common::{calls, harness, sample_booking, ADMIN_EMAIL};
use consult_notify::request::{FIELD_TO_EMAIL, FIELD_TO_NAME};
use consult_notify::{ContactMessage, DeliveryChannel, NotificationRequest};

// ---------------------------------------------------------------------------
// consultation_booking
// ---------------------------------------------------------------------------

/// A failing booking email is attempted once, never triggers the customer
/// confirmation, and raises exactly one user alert.
#[tokio::test]
async fn booking_primary_failure_alerts_once_without_confirmation() {
    let h = harness(false, true);
    let request = NotificationRequest::consultation_booking(ADMIN_EMAIL, &sample_booking());

    let outcome = h.dispatcher.dispatch(&request).await;
    h.dispatcher.drain_detached().await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.attempted_channel, DeliveryChannel::EmailProvider);
    assert!(outcome.error_detail.is_some());
    assert!(outcome
        .fallback_link
        .as_deref()
        .is_some_and(|link| link.starts_with("mailto:admin@consultpro.example")));

    assert_eq!(calls(&h.log), vec!["email_provider:template_booking"]);
    assert!(h.backend.confirmations().is_empty());
    assert_eq!(h.notifier.count(), 1);
    assert!(h.notifier.messages()[0].contains(ADMIN_EMAIL));
}

/// A delivered booking email spawns the customer confirmation.
#[tokio::test]
async fn booking_success_spawns_customer_confirmation() {
    let h = harness(true, true);
    let request = NotificationRequest::consultation_booking(ADMIN_EMAIL, &sample_booking());

    let outcome = h.dispatcher.dispatch(&request).await;
    h.dispatcher.drain_detached().await;

    assert!(outcome.succeeded);
    let sends = h.email.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].1.get(FIELD_TO_EMAIL), Some(ADMIN_EMAIL));

    assert_eq!(
        h.backend.confirmations(),
        vec![("john@company.com".to_string(), "John Doe".to_string())]
    );
    assert_eq!(h.notifier.count(), 0);
}

/// The booking stays delivered even when every confirmation channel fails.
#[tokio::test]
async fn failed_confirmation_does_not_fail_booking() {
    let h = harness(true, false);
    let request = NotificationRequest::consultation_booking(ADMIN_EMAIL, &sample_booking());

    let outcome = h.dispatcher.dispatch(&request).await;
    // The confirmation's provider fallback must fail too.
    h.email.set_succeed(false);
    h.dispatcher.drain_detached().await;

    assert!(outcome.succeeded);
    assert_eq!(h.notifier.count(), 0);
    assert_eq!(h.backend.confirmations().len(), 1);
    assert_eq!(h.dispatcher.detached_in_flight(), 0);
}

// ---------------------------------------------------------------------------
// confirmation
// ---------------------------------------------------------------------------

/// A successful backend call skips the email provider entirely.
#[tokio::test]
async fn confirmation_backend_success_skips_provider() {
    let h = harness(true, true);
    let request = NotificationRequest::confirmation(&sample_booking());

    let outcome = h.dispatcher.dispatch(&request).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempted_channel, DeliveryChannel::HttpBackend);
    assert!(h.email.sends().is_empty());
    assert_eq!(calls(&h.log), vec!["http_backend:confirmation"]);
}

/// Backend failure falls back to the provider with the reduced template.
#[tokio::test]
async fn confirmation_backend_failure_uses_provider() {
    let h = harness(true, false);
    let request = NotificationRequest::confirmation(&sample_booking());

    let outcome = h.dispatcher.dispatch(&request).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempted_channel, DeliveryChannel::EmailProvider);
    let sends = h.email.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].0, "template_confirmation");
    assert_eq!(sends[0].1.get(FIELD_TO_EMAIL), Some("john@company.com"));
    assert!(!sends[0].1.contains(FIELD_TO_NAME));
}

/// Both channels failing are each tried once, in order, with no alert.
#[tokio::test]
async fn confirmation_full_fallback_resolves_without_alert() {
    let h = harness(false, false);
    let request = NotificationRequest::confirmation(&sample_booking());

    let outcome = h.dispatcher.dispatch(&request).await;

    assert!(!outcome.succeeded);
    assert_eq!(
        calls(&h.log),
        vec!["http_backend:confirmation", "email_provider:template_confirmation"]
    );
    assert_eq!(h.notifier.count(), 0);
}

// ---------------------------------------------------------------------------
// contact_form / newsletter_confirmation
// ---------------------------------------------------------------------------

fn contact_message() -> ContactMessage {
    ContactMessage {
        name: "Jane Smith".to_string(),
        email: "jane@example.com".to_string(),
        phone: Some("+1 555 0100".to_string()),
        company: None,
        subject: Some("Partnership".to_string()),
        message: "Let's talk.".to_string(),
    }
}

#[tokio::test]
async fn contact_form_failure_alerts_user() {
    let h = harness(false, true);
    let request = NotificationRequest::contact_form(ADMIN_EMAIL, &contact_message());

    let outcome = h.dispatcher.dispatch(&request).await;

    assert!(!outcome.succeeded);
    assert_eq!(calls(&h.log), vec!["email_provider:template_contact"]);
    assert_eq!(h.notifier.count(), 1);
    assert!(outcome.fallback_link.is_none());
}

#[tokio::test]
async fn contact_form_success_is_silent() {
    let h = harness(true, true);
    let request = NotificationRequest::contact_form(ADMIN_EMAIL, &contact_message());

    assert!(h.dispatcher.dispatch(&request).await.succeeded);
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn newsletter_confirmation_failure_is_logged_only() {
    let h = harness(false, true);
    let request = NotificationRequest::newsletter_confirmation("reader@example.com");

    let outcome = h.dispatcher.dispatch(&request).await;

    assert!(!outcome.succeeded);
    assert_eq!(calls(&h.log), vec!["email_provider:template_newsletter"]);
    assert_eq!(h.notifier.count(), 0);
}

// ---------------------------------------------------------------------------
// with_notifier
// ---------------------------------------------------------------------------

#[tokio::test]
async fn with_notifier_redirects_alerts() {
    let h = harness(false, true);
    let local = std::sync::Arc::new(consult_notify::RecordingNotifier::new());
    let dispatcher = h.dispatcher.with_notifier(local.clone());

    let request = NotificationRequest::contact_form(ADMIN_EMAIL, &contact_message());
    dispatcher.dispatch(&request).await;

    assert_eq!(local.count(), 1);
    assert_eq!(h.notifier.count(), 0);
}
