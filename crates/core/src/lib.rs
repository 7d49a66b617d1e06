//! Consultation booking domain.
//!
//! Pure types and rules shared by the notification dispatcher and the HTTP
//! service: the accumulating [`booking::BookingDraft`], the step-gated
//! [`booking_wizard`] state machine, and the static [`catalog`] the option
//! steps choose from.

pub mod booking;
pub mod booking_wizard;
pub mod catalog;
pub mod error;
