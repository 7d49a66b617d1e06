use axum::routing::post;
use axum::Router;

use crate::handlers::relay;
use crate::state::AppState;

/// SMTP relay routes (root-level, matching the email backend contract).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/email/confirmation", post(relay::send_confirmation))
        .route("/email/newsletter", post(relay::record_newsletter_subscription))
}
