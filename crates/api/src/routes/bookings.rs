//! Route definitions for booking wizard sessions.
//!
//! Mounted at `/bookings` by `api_routes()`.
//!
//! ```text
//! POST   /                              create_session
//! GET    /{id}                          get_session
//! DELETE /{id}                          abandon_session
//! PATCH  /{id}/draft                    update_draft
//! POST   /{id}/advance                  advance
//! POST   /{id}/retreat                  retreat
//! POST   /{id}/jump                     jump {step}
//! POST   /{id}/submit                   submit
//! ```

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Booking wizard routes — mounted at `/bookings`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(bookings::create_session))
        .route(
            "/{id}",
            get(bookings::get_session).delete(bookings::abandon_session),
        )
        .route("/{id}/draft", patch(bookings::update_draft))
        .route("/{id}/advance", post(bookings::advance))
        .route("/{id}/retreat", post(bookings::retreat))
        .route("/{id}/jump", post(bookings::jump))
        .route("/{id}/submit", post(bookings::submit))
}
