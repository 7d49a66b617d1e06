//! Notification requests and delivery outcomes.
//!
//! A [`NotificationRequest`] is built by one of the kind-specific
//! constructors, which fill in every template field the kind's email
//! template expects. Requests are never stored; each is consumed by a
//! single [`dispatch`](crate::NotificationDispatcher::dispatch) call.

use std::collections::BTreeMap;

use consult_core::booking::{CompletedBooking, ContactInfo};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Template field names
// ---------------------------------------------------------------------------

pub const FIELD_TO_EMAIL: &str = "to_email";
pub const FIELD_TO_NAME: &str = "to_name";
pub const FIELD_FROM_NAME: &str = "from_name";
pub const FIELD_FROM_EMAIL: &str = "from_email";
pub const FIELD_REPLY_TO: &str = "reply_to";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_COMPANY: &str = "company";
pub const FIELD_SUBJECT: &str = "subject";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_SERVICE_NAME: &str = "service_name";
pub const FIELD_SERVICE_CATEGORY: &str = "service_category";
pub const FIELD_SERVICE_DURATION: &str = "service_duration";
pub const FIELD_SERVICE_PRICE: &str = "service_price";
pub const FIELD_CONSULTANT_NAME: &str = "consultant_name";
pub const FIELD_CONSULTANT_ROLE: &str = "consultant_role";
pub const FIELD_BOOKING_DATE: &str = "booking_date";
pub const FIELD_BOOKING_TIME: &str = "booking_time";
pub const FIELD_TIMEZONE: &str = "timezone";
pub const FIELD_PROJECT_DESCRIPTION: &str = "project_description";
pub const FIELD_GOALS: &str = "goals";
pub const FIELD_BUDGET: &str = "budget";
pub const FIELD_URGENCY: &str = "urgency";
pub const FIELD_PREFERRED_FORMAT: &str = "preferred_format";

/// Placeholder for optional contact fields the customer left blank.
const NOT_PROVIDED: &str = "Not provided";

/// Sender name shown on customer-facing emails.
pub const BUSINESS_NAME: &str = "ConsultPro";

/// Fields carried over from a booking email into the customer confirmation.
const CONFIRMATION_SUMMARY_FIELDS: &[&str] = &[
    FIELD_SERVICE_NAME,
    FIELD_SERVICE_DURATION,
    FIELD_CONSULTANT_NAME,
    FIELD_BOOKING_DATE,
    FIELD_BOOKING_TIME,
    FIELD_TIMEZONE,
    FIELD_PREFERRED_FORMAT,
];

// ---------------------------------------------------------------------------
// NotificationKind
// ---------------------------------------------------------------------------

/// The four kinds of outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Booking details sent to the business.
    ConsultationBooking,
    /// Booking confirmation sent to the customer.
    Confirmation,
    /// Contact-form message sent to the business.
    ContactForm,
    /// Welcome email sent to a new newsletter subscriber.
    NewsletterConfirmation,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConsultationBooking => "consultation_booking",
            Self::Confirmation => "confirmation",
            Self::ContactForm => "contact_form",
            Self::NewsletterConfirmation => "newsletter_confirmation",
        }
    }

    /// Whether total delivery failure is surfaced to the user.
    pub fn alerts_on_failure(self) -> bool {
        matches!(self, Self::ConsultationBooking | Self::ContactForm)
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TemplateFields
// ---------------------------------------------------------------------------

/// Named string values substituted into an email template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateFields(BTreeMap<String, String>);

impl TemplateFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Who a notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
}

/// A message submitted through the website contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

/// One outbound message, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub recipient: Recipient,
    pub payload: TemplateFields,
}

fn or_not_provided(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

/// Date in the long form used by every booking template, e.g.
/// `"Saturday, January 20, 2024"`.
fn format_booking_date(booking: &CompletedBooking) -> String {
    booking.schedule.date.format("%A, %B %-d, %Y").to_string()
}

/// Fields shared by the booking and confirmation templates.
fn booking_summary_fields(booking: &CompletedBooking) -> TemplateFields {
    TemplateFields::new()
        .with(FIELD_SERVICE_NAME, booking.service.name.as_str())
        .with(FIELD_SERVICE_DURATION, format!("{} minutes", booking.service.duration_minutes))
        .with(FIELD_CONSULTANT_NAME, booking.consultant.name.as_str())
        .with(FIELD_BOOKING_DATE, format_booking_date(booking))
        .with(FIELD_BOOKING_TIME, booking.schedule.time.as_str())
        .with(FIELD_TIMEZONE, booking.schedule.timezone.as_str())
        .with(FIELD_PREFERRED_FORMAT, booking.details.preferred_format.label())
}

fn contact_recipient(contact: &ContactInfo) -> Recipient {
    Recipient {
        email: contact.email.clone(),
        name: Some(contact.name.clone()),
    }
}

impl NotificationRequest {
    /// Booking details for the business inbox at `admin_email`.
    pub fn consultation_booking(admin_email: &str, booking: &CompletedBooking) -> Self {
        let contact = &booking.contact_info;
        let details = &booking.details;

        let mut payload = booking_summary_fields(booking)
            .with(FIELD_TO_EMAIL, admin_email)
            .with(FIELD_FROM_NAME, contact.name.as_str())
            .with(FIELD_FROM_EMAIL, contact.email.as_str())
            .with(FIELD_REPLY_TO, contact.email.as_str())
            .with(FIELD_PHONE, or_not_provided(&contact.phone))
            .with(FIELD_COMPANY, or_not_provided(&contact.company))
            .with(FIELD_SERVICE_CATEGORY, booking.service.category.as_str())
            .with(FIELD_SERVICE_PRICE, format!("${}", booking.service.price))
            .with(FIELD_CONSULTANT_ROLE, booking.consultant.role.as_str())
            .with(FIELD_PROJECT_DESCRIPTION, details.project_description.as_str())
            .with(FIELD_GOALS, details.goals.as_str())
            .with(FIELD_BUDGET, details.budget.as_str())
            .with(FIELD_URGENCY, details.urgency.label());

        payload.insert(
            FIELD_SUBJECT,
            format!("New consultation booking: {}", booking.service.name),
        );
        payload.insert(
            FIELD_MESSAGE,
            format!(
                "{} booked a {} with {} on {} at {} ({}).",
                contact.name,
                booking.service.name,
                booking.consultant.name,
                format_booking_date(booking),
                booking.schedule.time,
                booking.schedule.timezone,
            ),
        );

        Self {
            kind: NotificationKind::ConsultationBooking,
            recipient: Recipient {
                email: admin_email.to_string(),
                name: None,
            },
            payload,
        }
    }

    /// Booking confirmation for the customer.
    pub fn confirmation(booking: &CompletedBooking) -> Self {
        let contact = &booking.contact_info;
        let payload = booking_summary_fields(booking)
            .with(FIELD_TO_EMAIL, contact.email.as_str())
            .with(FIELD_TO_NAME, contact.name.as_str());

        Self {
            kind: NotificationKind::Confirmation,
            recipient: contact_recipient(contact),
            payload,
        }
    }

    /// Contact-form message for the business inbox at `admin_email`.
    pub fn contact_form(admin_email: &str, message: &ContactMessage) -> Self {
        let subject = message
            .subject
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("New contact form message from {}", message.name));

        let payload = TemplateFields::new()
            .with(FIELD_TO_EMAIL, admin_email)
            .with(FIELD_FROM_NAME, message.name.as_str())
            .with(FIELD_FROM_EMAIL, message.email.as_str())
            .with(FIELD_REPLY_TO, message.email.as_str())
            .with(FIELD_PHONE, or_not_provided(message.phone.as_deref().unwrap_or_default()))
            .with(FIELD_COMPANY, or_not_provided(message.company.as_deref().unwrap_or_default()))
            .with(FIELD_SUBJECT, subject)
            .with(FIELD_MESSAGE, message.message.as_str());

        Self {
            kind: NotificationKind::ContactForm,
            recipient: Recipient {
                email: admin_email.to_string(),
                name: None,
            },
            payload,
        }
    }

    /// Welcome email for a new newsletter subscriber.
    pub fn newsletter_confirmation(subscriber_email: &str) -> Self {
        let payload = TemplateFields::new()
            .with(FIELD_TO_EMAIL, subscriber_email)
            .with(FIELD_FROM_NAME, BUSINESS_NAME)
            .with(FIELD_SUBJECT, format!("Welcome to the {BUSINESS_NAME} newsletter"))
            .with(
                FIELD_MESSAGE,
                "Thanks for subscribing! You'll receive our latest insights and updates.",
            );

        Self {
            kind: NotificationKind::NewsletterConfirmation,
            recipient: Recipient {
                email: subscriber_email.to_string(),
                name: None,
            },
            payload,
        }
    }

    /// The customer confirmation that follows a delivered booking email.
    ///
    /// Returns `None` for any other kind, or when the booking payload lacks
    /// the customer's address.
    pub fn follow_up_confirmation(&self) -> Option<Self> {
        if self.kind != NotificationKind::ConsultationBooking {
            return None;
        }
        let email = self.payload.get(FIELD_FROM_EMAIL)?.to_string();
        let name = self.payload.get(FIELD_FROM_NAME).unwrap_or_default().to_string();

        let mut payload = TemplateFields::new()
            .with(FIELD_TO_EMAIL, email.as_str())
            .with(FIELD_TO_NAME, name.as_str());
        for field in CONFIRMATION_SUMMARY_FIELDS {
            if let Some(value) = self.payload.get(field) {
                payload.insert(field, value);
            }
        }

        Some(Self {
            kind: NotificationKind::Confirmation,
            recipient: Recipient {
                email,
                name: Some(name),
            },
            payload,
        })
    }

    /// Reduced field set for the generic confirmation template used when the
    /// confirmation backend is unreachable.
    pub fn confirmation_fallback_fields(&self) -> TemplateFields {
        let greeting = self
            .recipient
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| format!("Hi {n},"))
            .unwrap_or_else(|| "Hello,".to_string());

        let mut lines = vec![
            greeting,
            String::new(),
            "Thank you for booking a consultation with us. Your booking is confirmed.".to_string(),
        ];
        if let (Some(service), Some(date), Some(time)) = (
            self.payload.get(FIELD_SERVICE_NAME),
            self.payload.get(FIELD_BOOKING_DATE),
            self.payload.get(FIELD_BOOKING_TIME),
        ) {
            lines.push(format!("{service} on {date} at {time}."));
        }

        TemplateFields::new()
            .with(FIELD_TO_EMAIL, self.recipient.email.as_str())
            .with(FIELD_FROM_NAME, BUSINESS_NAME)
            .with(FIELD_SUBJECT, "Your consultation booking is confirmed")
            .with(FIELD_MESSAGE, lines.join("\n"))
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A concrete delivery mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// Transactional email provider.
    EmailProvider,
    /// Remote confirmation/newsletter HTTP backend.
    HttpBackend,
}

impl DeliveryChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailProvider => "email_provider",
            Self::HttpBackend => "http_backend",
        }
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    /// The last channel attempted.
    pub attempted_channel: DeliveryChannel,
    pub succeeded: bool,
    pub error_detail: Option<String>,
    /// `mailto:` link offered to the user when a booking could not be sent.
    pub fallback_link: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(channel: DeliveryChannel) -> Self {
        Self {
            attempted_channel: channel,
            succeeded: true,
            error_detail: None,
            fallback_link: None,
        }
    }

    pub fn failed(channel: DeliveryChannel, detail: impl Into<String>) -> Self {
        Self {
            attempted_channel: channel,
            succeeded: false,
            error_detail: Some(detail.into()),
            fallback_link: None,
        }
    }

    pub fn with_fallback_link(mut self, link: impl Into<String>) -> Self {
        self.fallback_link = Some(link.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
