//! Handlers for the static booking catalog.
//!
//! These back the option lists of wizard steps 1-3.

use axum::extract::{Path, Query};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use consult_core::booking::{ConsultantSelection, ServiceSelection};
use consult_core::catalog::{self, DEFAULT_BOOKABLE_DAYS, MAX_BOOKABLE_DAYS, TIMEZONES, TIME_SLOTS};
use consult_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Parameters for the schedule options listing.
#[derive(Debug, Deserialize)]
pub struct ScheduleParams {
    /// Dates are offered strictly after this day (default: today, UTC).
    pub from: Option<NaiveDate>,
    /// Number of bookable weekdays to return.
    pub days: Option<usize>,
}

/// Choices offered on the date and time step.
#[derive(Debug, Serialize)]
pub struct ScheduleOptions {
    pub dates: Vec<NaiveDate>,
    pub time_slots: &'static [&'static str],
    pub timezones: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// GET /catalog/services
// ---------------------------------------------------------------------------

pub async fn list_services() -> Json<DataResponse<Vec<ServiceSelection>>> {
    Json(DataResponse {
        data: catalog::services(),
    })
}

// ---------------------------------------------------------------------------
// GET /catalog/services/{id}
// ---------------------------------------------------------------------------

pub async fn get_service(Path(id): Path<String>) -> AppResult<Json<DataResponse<ServiceSelection>>> {
    let service = catalog::find_service(&id).ok_or(CoreError::NotFound {
        entity: "Service",
        id,
    })?;
    Ok(Json(DataResponse { data: service }))
}

// ---------------------------------------------------------------------------
// GET /catalog/consultants
// ---------------------------------------------------------------------------

pub async fn list_consultants() -> Json<DataResponse<Vec<ConsultantSelection>>> {
    Json(DataResponse {
        data: catalog::consultants(),
    })
}

// ---------------------------------------------------------------------------
// GET /catalog/consultants/{id}
// ---------------------------------------------------------------------------

pub async fn get_consultant(
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<ConsultantSelection>>> {
    let consultant = catalog::find_consultant(&id).ok_or(CoreError::NotFound {
        entity: "Consultant",
        id,
    })?;
    Ok(Json(DataResponse { data: consultant }))
}

// ---------------------------------------------------------------------------
// GET /catalog/schedule
// ---------------------------------------------------------------------------

/// Bookable dates, time slots and timezones.
pub async fn schedule_options(
    Query(params): Query<ScheduleParams>,
) -> AppResult<Json<DataResponse<ScheduleOptions>>> {
    let days = params.days.unwrap_or(DEFAULT_BOOKABLE_DAYS);
    if days == 0 || days > MAX_BOOKABLE_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be between 1 and {MAX_BOOKABLE_DAYS}"
        )));
    }
    let from = params.from.unwrap_or_else(|| Utc::now().date_naive());

    Ok(Json(DataResponse {
        data: ScheduleOptions {
            dates: catalog::available_dates(from, days),
            time_slots: TIME_SLOTS,
            timezones: TIMEZONES,
        },
    }))
}
