//! Consultation catalog.
//!
//! The fixed set of services, consultants, time slots and timezones the
//! wizard's option steps offer. Bookable dates are weekdays only.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::booking::{ConsultantSelection, ServiceSelection};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Wall-clock slots offered on every bookable day.
pub const TIME_SLOTS: &[&str] = &[
    "9:00 AM", "10:00 AM", "11:00 AM", "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM",
];

/// Timezones the schedule step lets the customer pick from.
pub const TIMEZONES: &[&str] = &[
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Berlin",
    "Asia/Tokyo",
    "Australia/Sydney",
];

/// Default number of bookable days shown on the schedule step.
pub const DEFAULT_BOOKABLE_DAYS: usize = 14;

/// Upper bound on bookable days a caller may request.
pub const MAX_BOOKABLE_DAYS: usize = 60;

// ---------------------------------------------------------------------------
// Services and consultants
// ---------------------------------------------------------------------------

fn service(id: &str, name: &str, duration_minutes: u32, price: u32, category: &str) -> ServiceSelection {
    ServiceSelection {
        id: id.to_string(),
        name: name.to_string(),
        duration_minutes,
        price,
        category: category.to_string(),
    }
}

fn consultant(id: &str, name: &str, role: &str, avatar_label: &str, rating: f32) -> ConsultantSelection {
    ConsultantSelection {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        avatar_label: avatar_label.to_string(),
        rating,
    }
}

/// All bookable services, in display order.
pub fn services() -> Vec<ServiceSelection> {
    vec![
        service("web-development", "Web Application Development", 60, 500, "Development"),
        service("mobile-development", "Mobile App Development", 60, 600, "Development"),
        service("ui-ux-design", "UI/UX Design Consultation", 45, 300, "Design"),
        service("digital-marketing", "Digital Marketing Strategy", 60, 400, "Marketing"),
        service("business-strategy", "Business Strategy Session", 90, 750, "Strategy"),
        service("cloud-solutions", "Cloud Infrastructure Review", 60, 550, "Infrastructure"),
    ]
}

/// All consultants, in display order.
pub fn consultants() -> Vec<ConsultantSelection> {
    vec![
        consultant("1", "Sarah Johnson", "Senior Business Consultant", "SJ", 4.9),
        consultant("2", "Michael Chen", "Lead Technical Architect", "MC", 4.8),
        consultant("3", "Emily Rodriguez", "UX Design Director", "ER", 4.9),
        consultant("4", "David Kim", "Digital Marketing Strategist", "DK", 4.7),
    ]
}

pub fn find_service(id: &str) -> Option<ServiceSelection> {
    services().into_iter().find(|s| s.id == id)
}

pub fn find_consultant(id: &str) -> Option<ConsultantSelection> {
    consultants().into_iter().find(|c| c.id == id)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Whether consultations can be booked on `date`.
pub fn is_bookable_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The next `count` bookable days strictly after `from`.
///
/// `count` is capped at [`MAX_BOOKABLE_DAYS`].
pub fn available_dates(from: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let count = count.min(MAX_BOOKABLE_DAYS);
    let mut dates = Vec::with_capacity(count);
    let mut day = from;

    while dates.len() < count {
        day = match day.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
        if is_bookable_day(day) {
            dates.push(day);
        }
    }

    dates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
