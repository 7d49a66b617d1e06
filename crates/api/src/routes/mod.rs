pub mod bookings;
pub mod catalog;
pub mod health;
pub mod relay;

use axum::routing::post;
use axum::Router;

use crate::handlers::forms;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /catalog/services                                list services
/// /catalog/consultants                             list consultants
/// /catalog/schedule                                bookable dates, slots, timezones
///
/// /bookings                                        start a wizard session (POST)
/// /bookings/{id}                                   snapshot (GET), abandon (DELETE)
/// /bookings/{id}/draft                             merge draft fields (PATCH)
/// /bookings/{id}/advance                           next step (POST)
/// /bookings/{id}/retreat                           previous step (POST)
/// /bookings/{id}/jump                              earlier step (POST)
/// /bookings/{id}/submit                            send the booking (POST)
///
/// /contact                                         contact form (POST)
/// /newsletter                                      newsletter sign-up (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/bookings", bookings::router())
        .route("/contact", post(forms::send_contact_message))
        .route("/newsletter", post(forms::subscribe_newsletter))
}
