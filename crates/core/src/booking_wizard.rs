//! Booking wizard steps and transitions.
//!
//! The wizard is a five-state machine. Each state carries the
//! [`BookingDraft`] built so far, and each step is gated on the presence of
//! its own draft record:
//!
//! | Step | State        | Required record |
//! |------|--------------|-----------------|
//! | 1    | `Service`    | `service`       |
//! | 2    | `Consultant` | `consultant`    |
//! | 3    | `Schedule`   | `schedule`      |
//! | 4    | `Details`    | `details`       |
//! | 5    | `Confirm`    | `contact_info`  |
//!
//! All functions here are pure; the stateful controller and the
//! notification side effects live in the API crate.

use serde::{Deserialize, Serialize};

use crate::booking::{BookingDraft, CompletedBooking, DraftField};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Wizard steps
// ---------------------------------------------------------------------------

/// The five steps of the booking wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Service,
    Consultant,
    Schedule,
    Details,
    Confirm,
}

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 5;

impl WizardStep {
    /// Convert a 1-based step number to a `WizardStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Service),
            2 => Ok(Self::Consultant),
            3 => Ok(Self::Schedule),
            4 => Ok(Self::Details),
            5 => Ok(Self::Confirm),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Service => 1,
            Self::Consultant => 2,
            Self::Schedule => 3,
            Self::Details => 4,
            Self::Confirm => 5,
        }
    }

    /// Human-readable label for the progress indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::Service => "Choose Service",
            Self::Consultant => "Select Consultant",
            Self::Schedule => "Pick Date & Time",
            Self::Details => "Project Details",
            Self::Confirm => "Confirm Booking",
        }
    }

    /// The draft record this step fills in.
    pub fn draft_field(self) -> DraftField {
        match self {
            Self::Service => DraftField::Service,
            Self::Consultant => DraftField::Consultant,
            Self::Schedule => DraftField::Schedule,
            Self::Details => DraftField::Details,
            Self::Confirm => DraftField::ContactInfo,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Service => Self::Consultant,
            Self::Consultant => Self::Schedule,
            Self::Schedule => Self::Details,
            Self::Details | Self::Confirm => Self::Confirm,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Service | Self::Consultant => Self::Service,
            Self::Schedule => Self::Consultant,
            Self::Details => Self::Schedule,
            Self::Confirm => Self::Details,
        }
    }
}

// ---------------------------------------------------------------------------
// Wizard state
// ---------------------------------------------------------------------------

/// Current wizard position together with the draft accumulated so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", content = "draft", rename_all = "snake_case")]
pub enum WizardState {
    Service(BookingDraft),
    Consultant(BookingDraft),
    Schedule(BookingDraft),
    Details(BookingDraft),
    Confirm(BookingDraft),
}

impl Default for WizardState {
    fn default() -> Self {
        Self::Service(BookingDraft::default())
    }
}

impl WizardState {
    /// A fresh wizard on step 1 with an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        match self {
            Self::Service(_) => WizardStep::Service,
            Self::Consultant(_) => WizardStep::Consultant,
            Self::Schedule(_) => WizardStep::Schedule,
            Self::Details(_) => WizardStep::Details,
            Self::Confirm(_) => WizardStep::Confirm,
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        match self {
            Self::Service(d)
            | Self::Consultant(d)
            | Self::Schedule(d)
            | Self::Details(d)
            | Self::Confirm(d) => d,
        }
    }

    pub fn draft_mut(&mut self) -> &mut BookingDraft {
        match self {
            Self::Service(d)
            | Self::Consultant(d)
            | Self::Schedule(d)
            | Self::Details(d)
            | Self::Confirm(d) => d,
        }
    }

    pub fn into_draft(self) -> BookingDraft {
        match self {
            Self::Service(d)
            | Self::Consultant(d)
            | Self::Schedule(d)
            | Self::Details(d)
            | Self::Confirm(d) => d,
        }
    }

    /// Move the draft into the state for `step`.
    pub fn into_step(self, step: WizardStep) -> Self {
        let draft = self.into_draft();
        match step {
            WizardStep::Service => Self::Service(draft),
            WizardStep::Consultant => Self::Consultant(draft),
            WizardStep::Schedule => Self::Schedule(draft),
            WizardStep::Details => Self::Details(draft),
            WizardStep::Confirm => Self::Confirm(draft),
        }
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Whether `step` is complete for the given draft.
pub fn can_proceed(step: WizardStep, draft: &BookingDraft) -> bool {
    match step {
        WizardStep::Service => draft.service.is_some(),
        WizardStep::Consultant => draft.consultant.is_some(),
        WizardStep::Schedule => draft.schedule.is_some(),
        WizardStep::Details => draft.details.is_some(),
        WizardStep::Confirm => draft.contact_info.is_some(),
    }
}

/// Whether the current step of `state` is complete.
pub fn can_advance(state: &WizardState) -> bool {
    can_proceed(state.step(), state.draft())
}

/// Move one step forward if the current step is complete.
///
/// Returns `state` unchanged when the step is incomplete or already on the
/// final step.
pub fn advance(state: WizardState) -> WizardState {
    if !can_advance(&state) {
        return state;
    }
    let next = state.step().next();
    state.into_step(next)
}

/// Move one step back. Never clears draft records.
pub fn retreat(state: WizardState) -> WizardState {
    let previous = state.step().previous();
    state.into_step(previous)
}

/// Validate a progress-indicator jump to step `target`.
///
/// Only jumps back to an earlier step are allowed.
pub fn validate_jump(state: &WizardState, target: u8) -> Result<WizardStep, CoreError> {
    let step = WizardStep::from_number(target)?;
    let current = state.step();
    if step >= current {
        return Err(CoreError::Validation(format!(
            "Cannot jump from step {} to step {target}. Only earlier steps can be revisited.",
            current.to_number()
        )));
    }
    Ok(step)
}

/// Check the state can be submitted and assemble the completed booking.
///
/// Submission is allowed only on the final step once contact information
/// has been entered.
pub fn validate_submit(state: &WizardState) -> Result<CompletedBooking, CoreError> {
    if state.step() != WizardStep::Confirm {
        return Err(CoreError::Validation(format!(
            "Cannot submit booking: must be on step {MAX_STEP} ({}), currently on step {}",
            WizardStep::Confirm.label(),
            state.step().to_number()
        )));
    }
    if !can_advance(state) {
        return Err(CoreError::Validation(
            "Cannot submit booking: contact information is required".to_string(),
        ));
    }
    CompletedBooking::try_from(state.draft())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::tests::{
        full_draft, sample_consultant, sample_contact, sample_details, sample_schedule,
        sample_service,
    };
    use crate::booking::DraftUpdate;

    fn state_at(step: u8, draft: BookingDraft) -> WizardState {
        WizardState::Service(draft).into_step(WizardStep::from_number(step).unwrap())
    }

    // -- WizardStep --

    #[test]
    fn step_from_number_invalid() {
        assert!(WizardStep::from_number(0).is_err());
        assert!(WizardStep::from_number(6).is_err());
        assert!(WizardStep::from_number(255).is_err());
    }

    #[test]
    fn step_to_number_roundtrip() {
        for n in MIN_STEP..=MAX_STEP {
            let step = WizardStep::from_number(n).unwrap();
            assert_eq!(step.to_number(), n);
            assert!(!step.label().is_empty());
        }
    }

    // -- WizardState --

    #[test]
    fn new_state_is_step_one_with_empty_draft() {
        let state = WizardState::new();
        assert_eq!(state.step(), WizardStep::Service);
        assert_eq!(state.draft(), &BookingDraft::default());
    }

    #[test]
    fn state_serializes_with_step_tag() {
        let json = serde_json::to_value(WizardState::new()).unwrap();
        assert_eq!(json["step"], "service");
        assert!(json["draft"]["service"].is_null());
    }

    // -- advance --

    #[test]
    fn advance_is_noop_for_every_incomplete_step() {
        for n in MIN_STEP..MAX_STEP {
            let mut draft = full_draft();
            match WizardStep::from_number(n).unwrap() {
                WizardStep::Service => draft.service = None,
                WizardStep::Consultant => draft.consultant = None,
                WizardStep::Schedule => draft.schedule = None,
                WizardStep::Details => draft.details = None,
                WizardStep::Confirm => unreachable!(),
            }
            let state = advance(state_at(n, draft));
            assert_eq!(state.step().to_number(), n, "advance from step {n} must be gated");
        }
    }

    #[test]
    fn advance_without_service_stays_on_step_one() {
        let state = advance(WizardState::new());
        assert_eq!(state.step(), WizardStep::Service);
    }

    #[test]
    fn advance_walks_through_all_steps() {
        let mut state = WizardState::new();
        let updates = [
            DraftUpdate {
                service: Some(sample_service()),
                ..Default::default()
            },
            DraftUpdate {
                consultant: Some(sample_consultant()),
                ..Default::default()
            },
            DraftUpdate {
                schedule: Some(sample_schedule()),
                ..Default::default()
            },
            DraftUpdate {
                details: Some(sample_details()),
                ..Default::default()
            },
        ];

        for (i, update) in updates.into_iter().enumerate() {
            state.draft_mut().apply(update);
            state = advance(state);
            assert_eq!(state.step().to_number(), i as u8 + 2);
        }
        assert_eq!(state.step(), WizardStep::Confirm);
    }

    #[test]
    fn advance_on_final_step_stays_on_final_step() {
        let state = advance(state_at(MAX_STEP, full_draft()));
        assert_eq!(state.step(), WizardStep::Confirm);
    }

    // -- retreat --

    #[test]
    fn retreat_reaches_step_one_in_four_calls() {
        let mut state = state_at(MAX_STEP, full_draft());
        for expected in (MIN_STEP..MAX_STEP).rev() {
            state = retreat(state);
            assert_eq!(state.step().to_number(), expected);
        }
        assert_eq!(state.step(), WizardStep::Service);

        // Further retreats are harmless.
        state = retreat(state);
        assert_eq!(state.step(), WizardStep::Service);
    }

    #[test]
    fn retreat_keeps_previously_entered_fields() {
        let mut state = WizardState::new();
        state.draft_mut().apply(DraftUpdate {
            service: Some(sample_service()),
            ..Default::default()
        });
        state = advance(state);
        assert_eq!(state.step(), WizardStep::Consultant);

        state = retreat(state);
        assert_eq!(state.step(), WizardStep::Service);
        assert_eq!(state.draft().service, Some(sample_service()));
    }

    // -- validate_jump --

    #[test]
    fn jump_rejected_to_current_or_later_steps() {
        let state = state_at(3, full_draft());
        for target in 3..=MAX_STEP {
            assert!(validate_jump(&state, target).is_err());
        }
    }

    #[test]
    fn jump_accepted_to_earlier_steps() {
        let state = state_at(4, full_draft());
        for target in MIN_STEP..4 {
            let step = validate_jump(&state, target).unwrap();
            assert_eq!(step.to_number(), target);
        }
    }

    #[test]
    fn jump_rejects_out_of_range() {
        let state = state_at(5, full_draft());
        assert!(validate_jump(&state, 0).is_err());
        assert!(validate_jump(&state, 9).is_err());
    }

    // -- validate_submit --

    #[test]
    fn submit_requires_final_step() {
        let state = state_at(4, full_draft());
        assert!(validate_submit(&state).is_err());
    }

    #[test]
    fn submit_requires_contact_info() {
        let mut draft = full_draft();
        draft.contact_info = None;
        assert!(validate_submit(&state_at(5, draft)).is_err());
    }

    #[test]
    fn submit_returns_completed_booking() {
        let booking = validate_submit(&state_at(5, full_draft())).unwrap();
        assert_eq!(booking.contact_info, sample_contact());
    }
}
