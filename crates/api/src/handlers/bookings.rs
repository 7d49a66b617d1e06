//! Handlers for booking wizard sessions.
//!
//! Each session wraps one [`BookingWizard`](crate::wizard::BookingWizard).
//! Navigation endpoints never fail on an incomplete step: they report
//! `moved: false` and leave the wizard where it was.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use consult_core::booking::{DraftField, DraftUpdate};
use consult_core::error::CoreError;
use consult_notify::{DeliveryOutcome, RecordingNotifier};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, WithAlerts};
use crate::state::AppState;
use crate::wizard::{RecordingNavigator, SessionHandle, WizardSession, WizardSnapshot};

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body for `POST /bookings/{id}/jump`.
#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub step: u8,
}

/// A session together with its wizard snapshot.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    #[serde(flatten)]
    pub wizard: WizardSnapshot,
}

impl From<&WizardSession> for SessionView {
    fn from(session: &WizardSession) -> Self {
        Self {
            id: session.id,
            wizard: session.wizard.snapshot(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DraftUpdated {
    pub updated: Vec<DraftField>,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct Navigated {
    pub moved: bool,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub submitted: bool,
    pub redirect: Option<String>,
    pub delivery: DeliveryOutcome,
    pub session: SessionView,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_session(state: &AppState, id: Uuid) -> AppResult<SessionHandle> {
    state.sessions.get(id).await.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "BookingSession",
            id: id.to_string(),
        })
    })
}

/// Lock the session, record activity and apply a navigation step.
async fn navigate(
    state: &AppState,
    id: Uuid,
    step: impl FnOnce(&mut WizardSession) -> bool,
) -> AppResult<Json<DataResponse<Navigated>>> {
    let handle = load_session(state, id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let moved = step(&mut *session);
    tracing::debug!(
        session_id = %id,
        step = session.wizard.current_step().to_number(),
        moved,
        "Wizard navigation"
    );

    Ok(Json(DataResponse {
        data: Navigated {
            moved,
            session: SessionView::from(&*session),
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /bookings
// ---------------------------------------------------------------------------

/// Start a new wizard session on step 1.
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let (id, handle) = state.sessions.create().await;
    let session = handle.lock().await;

    tracing::info!(session_id = %id, "Booking session started");

    (
        StatusCode::CREATED,
        Json(DataResponse {
            data: SessionView::from(&*session),
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /bookings/{id}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let handle = load_session(&state, id).await?;
    let session = handle.lock().await;

    Ok(Json(DataResponse {
        data: SessionView::from(&*session),
    }))
}

// ---------------------------------------------------------------------------
// PATCH /bookings/{id}/draft
// ---------------------------------------------------------------------------

/// Merge the supplied records into the draft.
pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<DraftUpdate>,
) -> AppResult<Json<DataResponse<DraftUpdated>>> {
    let handle = load_session(&state, id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let updated = session.wizard.update_draft(update);
    tracing::debug!(
        session_id = %id,
        fields = ?updated.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
        "Draft updated"
    );

    Ok(Json(DataResponse {
        data: DraftUpdated {
            updated,
            session: SessionView::from(&*session),
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /bookings/{id}/advance, /retreat, /jump
// ---------------------------------------------------------------------------

pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Navigated>>> {
    navigate(&state, id, |session| session.wizard.advance()).await
}

pub async fn retreat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<Navigated>>> {
    navigate(&state, id, |session| session.wizard.retreat()).await
}

/// Jump back to an earlier step. Forward jumps are a validation error.
pub async fn jump(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JumpRequest>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let handle = load_session(&state, id).await?;
    let mut session = handle.lock().await;
    session.touch();

    session.wizard.jump_to(body.step)?;

    Ok(Json(DataResponse {
        data: SessionView::from(&*session),
    }))
}

// ---------------------------------------------------------------------------
// POST /bookings/{id}/submit
// ---------------------------------------------------------------------------

/// Send the booking. The session is discarded once the booking is delivered.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DataResponse<WithAlerts<Submitted>>>> {
    let handle = load_session(&state, id).await?;

    let notifier = Arc::new(RecordingNotifier::new());
    let dispatcher = state.dispatcher.with_notifier(notifier.clone());
    let navigator = RecordingNavigator::new();

    let (outcome, view) = {
        let mut session = handle.lock().await;
        session.touch();
        let outcome = session.wizard.submit(&dispatcher, &navigator).await?;
        (outcome, SessionView::from(&*session))
    };

    if outcome.submitted() {
        state.sessions.remove(id).await;
    }

    Ok(Json(DataResponse {
        data: WithAlerts {
            result: Submitted {
                submitted: outcome.submitted(),
                redirect: navigator.last(),
                delivery: outcome.delivery,
                session: view,
            },
            alerts: notifier.take(),
        },
    }))
}

// ---------------------------------------------------------------------------
// DELETE /bookings/{id}
// ---------------------------------------------------------------------------

/// Abandon a session.
pub async fn abandon_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !state.sessions.remove(id).await {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "BookingSession",
            id: id.to_string(),
        }));
    }
    tracing::info!(session_id = %id, "Booking session abandoned");
    Ok(StatusCode::NO_CONTENT)
}
