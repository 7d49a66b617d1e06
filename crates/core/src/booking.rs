//! Booking draft records.
//!
//! A [`BookingDraft`] accumulates one optional record per wizard step. The
//! draft is only ever grown by [`BookingDraft::apply`]; nothing clears a
//! field once it is set. A draft with every record present converts into a
//! [`CompletedBooking`], which is the only input accepted by the booking
//! notification constructors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Step records
// ---------------------------------------------------------------------------

/// Service chosen at step 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub id: String,
    pub name: String,
    pub duration_minutes: u32,
    /// Price in whole US dollars.
    pub price: u32,
    pub category: String,
}

/// Consultant chosen at step 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultantSelection {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Initials shown in place of a portrait, e.g. `"SJ"`.
    pub avatar_label: String,
    pub rating: f32,
}

/// Date and time chosen at step 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    /// Wall-clock slot label, e.g. `"2:00 PM"`.
    pub time: String,
    /// IANA timezone name, e.g. `"America/New_York"`.
    pub timezone: String,
}

/// How soon the customer needs the engagement to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Human-readable label used in email templates.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low - Flexible timeline",
            Self::Medium => "Medium - Within a few weeks",
            Self::High => "High - As soon as possible",
        }
    }
}

/// Meeting format for the consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredFormat {
    Video,
    Phone,
    Chat,
}

impl PreferredFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Phone => "phone",
            Self::Chat => "chat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "Video Call",
            Self::Phone => "Phone Call",
            Self::Chat => "Chat",
        }
    }
}

/// Project details entered at step 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub project_description: String,
    pub goals: String,
    /// Free-form budget bracket, e.g. `"$1,000-$2,500"`.
    pub budget: String,
    pub urgency: Urgency,
    pub preferred_format: PreferredFormat,
}

/// Customer contact information entered at step 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
}

// ---------------------------------------------------------------------------
// Draft fields
// ---------------------------------------------------------------------------

/// Names the five optional records of a [`BookingDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Service,
    Consultant,
    Schedule,
    Details,
    ContactInfo,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Consultant => "consultant",
            Self::Schedule => "schedule",
            Self::Details => "details",
            Self::ContactInfo => "contact_info",
        }
    }
}

// ---------------------------------------------------------------------------
// BookingDraft
// ---------------------------------------------------------------------------

/// The in-progress booking accumulated across wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub service: Option<ServiceSelection>,
    pub consultant: Option<ConsultantSelection>,
    pub schedule: Option<Schedule>,
    pub details: Option<ProjectDetails>,
    pub contact_info: Option<ContactInfo>,
}

/// A partial set of draft fields to merge into a [`BookingDraft`].
///
/// Absent fields leave the draft untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftUpdate {
    pub service: Option<ServiceSelection>,
    pub consultant: Option<ConsultantSelection>,
    pub schedule: Option<Schedule>,
    pub details: Option<ProjectDetails>,
    pub contact_info: Option<ContactInfo>,
}

impl DraftUpdate {
    pub fn is_empty(&self) -> bool {
        self.service.is_none()
            && self.consultant.is_none()
            && self.schedule.is_none()
            && self.details.is_none()
            && self.contact_info.is_none()
    }
}

impl BookingDraft {
    /// Shallow-merge `update` into the draft.
    ///
    /// Returns the fields that were written, in step order.
    pub fn apply(&mut self, update: DraftUpdate) -> Vec<DraftField> {
        let mut touched = Vec::new();

        if let Some(service) = update.service {
            self.service = Some(service);
            touched.push(DraftField::Service);
        }
        if let Some(consultant) = update.consultant {
            self.consultant = Some(consultant);
            touched.push(DraftField::Consultant);
        }
        if let Some(schedule) = update.schedule {
            self.schedule = Some(schedule);
            touched.push(DraftField::Schedule);
        }
        if let Some(details) = update.details {
            self.details = Some(details);
            touched.push(DraftField::Details);
        }
        if let Some(contact_info) = update.contact_info {
            self.contact_info = Some(contact_info);
            touched.push(DraftField::ContactInfo);
        }

        touched
    }

    /// Whether the given record has been filled in.
    pub fn is_set(&self, field: DraftField) -> bool {
        match field {
            DraftField::Service => self.service.is_some(),
            DraftField::Consultant => self.consultant.is_some(),
            DraftField::Schedule => self.schedule.is_some(),
            DraftField::Details => self.details.is_some(),
            DraftField::ContactInfo => self.contact_info.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// CompletedBooking
// ---------------------------------------------------------------------------

/// A booking with every step record present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedBooking {
    pub service: ServiceSelection,
    pub consultant: ConsultantSelection,
    pub schedule: Schedule,
    pub details: ProjectDetails,
    pub contact_info: ContactInfo,
}

impl TryFrom<&BookingDraft> for CompletedBooking {
    type Error = CoreError;

    fn try_from(draft: &BookingDraft) -> Result<Self, Self::Error> {
        fn require<T: Clone>(value: &Option<T>, field: DraftField) -> Result<T, CoreError> {
            value.clone().ok_or_else(|| {
                CoreError::Validation(format!(
                    "Booking is incomplete: '{}' has not been set",
                    field.as_str()
                ))
            })
        }

        Ok(Self {
            service: require(&draft.service, DraftField::Service)?,
            consultant: require(&draft.consultant, DraftField::Consultant)?,
            schedule: require(&draft.schedule, DraftField::Schedule)?,
            details: require(&draft.details, DraftField::Details)?,
            contact_info: require(&draft.contact_info, DraftField::ContactInfo)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
