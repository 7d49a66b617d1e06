//! Stateful booking wizard controller.
//!
//! [`BookingWizard`] owns a [`WizardState`] and layers the submission
//! lifecycle on top of the pure transitions in
//! [`consult_core::booking_wizard`]: an in-flight flag, the retryable error
//! from the last failed attempt, and the redirect issued on success.

use std::sync::Mutex;

use serde::Serialize;

use consult_core::booking::{BookingDraft, DraftField, DraftUpdate};
use consult_core::booking_wizard::{self, WizardState, WizardStep, MAX_STEP, MIN_STEP};
use consult_core::error::CoreError;
use consult_notify::{DeliveryOutcome, NotificationDispatcher, NotificationRequest};

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Client-side navigation issued after a successful submission.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Captures redirects instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The most recent redirect target, if any.
    pub fn last(&self) -> Option<String> {
        self.redirects().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        tracing::debug!(path, "Recording redirect");
        self.redirects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Result of one [`BookingWizard::submit`] attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub delivery: DeliveryOutcome,
    /// Path the client was redirected to; `None` when the booking was not sent.
    pub redirect: Option<String>,
}

impl SubmitOutcome {
    pub fn submitted(&self) -> bool {
        self.delivery.succeeded
    }
}

/// One entry of the progress indicator.
#[derive(Debug, Clone, Serialize)]
pub struct StepProgress {
    pub number: u8,
    pub label: &'static str,
    pub complete: bool,
    pub current: bool,
}

/// Serializable view of a wizard for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub step: u8,
    pub step_label: &'static str,
    pub can_proceed: bool,
    pub is_submitting: bool,
    pub last_error: Option<String>,
    pub steps: Vec<StepProgress>,
    pub draft: BookingDraft,
}

// ---------------------------------------------------------------------------
// BookingWizard
// ---------------------------------------------------------------------------

fn submit_failure_message(contact_email: &str) -> String {
    format!(
        "Your booking could not be sent. Please try again, \
         or contact us directly at {contact_email}."
    )
}

/// A booking wizard with its submission lifecycle.
#[derive(Debug, Clone)]
pub struct BookingWizard {
    state: WizardState,
    is_submitting: bool,
    last_error: Option<String>,
    success_path: String,
}

impl BookingWizard {
    /// A wizard on step 1 with an empty draft.
    pub fn new(success_path: impl Into<String>) -> Self {
        Self {
            state: WizardState::new(),
            is_submitting: false,
            last_error: None,
            success_path: success_path.into(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.step()
    }

    pub fn draft(&self) -> &BookingDraft {
        self.state.draft()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Message from the last failed submission, cleared by the next edit or
    /// attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn success_path(&self) -> &str {
        &self.success_path
    }

    /// Shallow-merge `update` into the draft. No validation is performed.
    pub fn update_draft(&mut self, update: DraftUpdate) -> Vec<DraftField> {
        let touched = self.state.draft_mut().apply(update);
        if !touched.is_empty() {
            self.last_error = None;
        }
        touched
    }

    pub fn can_proceed(&self, step: WizardStep) -> bool {
        booking_wizard::can_proceed(step, self.draft())
    }

    /// Move forward one step. Returns `false` when the current step is
    /// incomplete or already the last.
    pub fn advance(&mut self) -> bool {
        let before = self.current_step();
        self.state = booking_wizard::advance(std::mem::take(&mut self.state));
        self.current_step() != before
    }

    /// Move back one step. Returns `false` on step 1.
    pub fn retreat(&mut self) -> bool {
        let before = self.current_step();
        self.state = booking_wizard::retreat(std::mem::take(&mut self.state));
        self.current_step() != before
    }

    /// Jump back to an earlier step from the progress indicator.
    pub fn jump_to(&mut self, step: u8) -> Result<(), CoreError> {
        let target = booking_wizard::validate_jump(&self.state, step)?;
        self.state = std::mem::take(&mut self.state).into_step(target);
        Ok(())
    }

    /// Send the booking to the business inbox.
    ///
    /// Returns a `Validation` error, without dispatching, unless the wizard
    /// is on the final step with contact information entered. Delivery
    /// failure is not an error: the outcome carries it, the wizard stays on
    /// the final step with the draft intact and [`last_error`] set so the
    /// user can retry.
    ///
    /// [`last_error`]: Self::last_error
    pub async fn submit(
        &mut self,
        dispatcher: &NotificationDispatcher,
        navigator: &dyn Navigator,
    ) -> Result<SubmitOutcome, CoreError> {
        if self.is_submitting {
            return Err(CoreError::Conflict(
                "A submission is already in progress".to_string(),
            ));
        }
        let booking = booking_wizard::validate_submit(&self.state)?;

        self.last_error = None;

        let request = NotificationRequest::consultation_booking(dispatcher.admin_email(), &booking);
        let submitting = SubmittingFlag::raise(&mut self.is_submitting);
        let delivery = dispatcher.dispatch(&request).await;
        drop(submitting);

        if delivery.succeeded {
            tracing::info!(
                customer = %booking.contact_info.email,
                service = %booking.service.id,
                consultant = %booking.consultant.id,
                "Booking submitted"
            );
            navigator.redirect(&self.success_path);
            return Ok(SubmitOutcome {
                delivery,
                redirect: Some(self.success_path.clone()),
            });
        }

        tracing::warn!(
            customer = %booking.contact_info.email,
            error = delivery.error_detail.as_deref().unwrap_or_default(),
            "Booking submission failed, draft kept for retry"
        );
        self.last_error = Some(submit_failure_message(&dispatcher.config().contact_email));
        Ok(SubmitOutcome {
            delivery,
            redirect: None,
        })
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let current = self.current_step();
        let steps = (MIN_STEP..=MAX_STEP)
            .filter_map(|n| WizardStep::from_number(n).ok())
            .map(|step| StepProgress {
                number: step.to_number(),
                label: step.label(),
                complete: step < current,
                current: step == current,
            })
            .collect();

        WizardSnapshot {
            step: current.to_number(),
            step_label: current.label(),
            can_proceed: self.can_proceed(current),
            is_submitting: self.is_submitting,
            last_error: self.last_error.clone(),
            steps,
            draft: self.draft().clone(),
        }
    }
}

/// Holds the in-flight flag raised until dropped, so a submit future that
/// is cancelled mid-dispatch still lowers it.
struct SubmittingFlag<'a>(&'a mut bool);

impl<'a> SubmittingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for SubmittingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
