//! Booking wizard controller and its session registry.

pub mod controller;
pub mod sessions;

pub use controller::{BookingWizard, Navigator, RecordingNavigator, SubmitOutcome, WizardSnapshot};
pub use sessions::{SessionHandle, SessionReaper, WizardSession, WizardSessions};
