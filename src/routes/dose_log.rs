use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;

use crate::error::{err, ApiError};
use crate::middleware::auth::SessionUser;
use crate::models::dose_log::{DoseLogResponse, ToggleDoseRequest, ToggleDoseResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{date_id}", get(get_dose_log))
        .route("/{date_id}/toggle", post(toggle_dose_entry))
}

fn parse_date_id(date_id: &str) -> Result<NaiveDate, (StatusCode, Json<ApiError>)> {
    NaiveDate::parse_from_str(date_id, "%Y-%m-%d")
        .map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid date id"))
}

#[utoipa::path(
    get,
    path = "/api/dose-log/{date_id}",
    params(("date_id" = String, Path, description = "UTC date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Entry ids marked taken for the date", body = DoseLogResponse),
        (status = 400, description = "Invalid date id", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "DoseLog"
)]
pub(crate) async fn get_dose_log(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(date_id): Path<String>,
) -> Result<Json<DoseLogResponse>, (StatusCode, Json<ApiError>)> {
    let date = parse_date_id(&date_id)?;

    let taken_entry_ids: Vec<String> = sqlx::query_scalar(
        "SELECT taken_entry_ids FROM dose_logs WHERE user_id = $1 AND date_id = $2",
    )
    .bind(&auth.uid)
    .bind(date)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
    .unwrap_or_default();

    Ok(Json(DoseLogResponse { taken_entry_ids }))
}

/// Flips an entry in the per-user, per-date taken set inside a single
/// transaction. The row is created lazily on the first toggle of a date;
/// only the set and `updated_at` are written on later toggles.
///
/// This is a pure flip, not set/clear: callers needing exactly-once
/// "mark taken" must read state first. A transaction failure propagates so
/// the caller can roll back optimistic UI state.
#[utoipa::path(
    post,
    path = "/api/dose-log/{date_id}/toggle",
    params(("date_id" = String, Path, description = "UTC date, YYYY-MM-DD")),
    request_body = ToggleDoseRequest,
    responses(
        (status = 200, description = "New membership state", body = ToggleDoseResponse),
        (status = 400, description = "Invalid date id or entry id", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "DoseLog"
)]
pub(crate) async fn toggle_dose_entry(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(date_id): Path<String>,
    payload: Result<Json<ToggleDoseRequest>, JsonRejection>,
) -> Result<Json<ToggleDoseResponse>, (StatusCode, Json<ApiError>)> {
    let Json(req) =
        payload.map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid request body"))?;
    let date = parse_date_id(&date_id)?;
    if req.entry_id.trim().is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "Entry id is required"));
    }

    let mut tx = state
        .db
        .begin()
        .await
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update dose log"))?;

    // FOR UPDATE on an absent row locks nothing, so two first toggles of the
    // same date could each read an empty set and the later write would drop
    // the earlier entry. Create the row first so the lock always lands.
    sqlx::query(
        "INSERT INTO dose_logs (user_id, date_id) VALUES ($1, $2)
         ON CONFLICT (user_id, date_id) DO NOTHING",
    )
    .bind(&auth.uid)
    .bind(date)
    .execute(&mut *tx)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update dose log"))?;

    let mut taken_entry_ids: Vec<String> = sqlx::query_scalar(
        "SELECT taken_entry_ids FROM dose_logs
         WHERE user_id = $1 AND date_id = $2 FOR UPDATE",
    )
    .bind(&auth.uid)
    .bind(date)
    .fetch_one(&mut *tx)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update dose log"))?;

    let taken = if let Some(pos) = taken_entry_ids.iter().position(|id| id == &req.entry_id) {
        taken_entry_ids.remove(pos);
        false
    } else {
        taken_entry_ids.push(req.entry_id.clone());
        true
    };

    sqlx::query(
        "UPDATE dose_logs SET taken_entry_ids = $3, updated_at = NOW()
         WHERE user_id = $1 AND date_id = $2",
    )
    .bind(&auth.uid)
    .bind(date)
    .bind(&taken_entry_ids)
    .execute(&mut *tx)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update dose log"))?;

    tx.commit()
        .await
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update dose log"))?;

    Ok(Json(ToggleDoseResponse { taken }))
}
