//! Route definitions for the booking catalog.
//!
//! Mounted at `/catalog` by `api_routes()`.
//!
//! ```text
//! GET    /services                      list_services
//! GET    /services/{id}                 get_service
//! GET    /consultants                   list_consultants
//! GET    /consultants/{id}              get_consultant
//! GET    /schedule                      schedule_options (?from, days)
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes — mounted at `/catalog`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/services", get(catalog::list_services))
        .route("/services/{id}", get(catalog::get_service))
        .route("/consultants", get(catalog::list_consultants))
        .route("/consultants/{id}", get(catalog::get_consultant))
        .route("/schedule", get(catalog::schedule_options))
}
