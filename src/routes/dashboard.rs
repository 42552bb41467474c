use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::middleware::auth::SessionUser;
use crate::models::supplement::Supplement;
use crate::schedule::{build_schedule, utc_date_id, DailySchedule};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(get_schedule))
        .route("/summary", get(get_summary))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub date_id: String,
    pub groups: DailySchedule,
    pub taken_entry_ids: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub date_id: String,
    pub supplement_count: i64,
}

/// Today's checklist: the user's supplements expanded into time-of-day
/// buckets, seeded with the entries already marked taken. Fetch failures
/// degrade to an empty schedule.
#[utoipa::path(
    get,
    path = "/api/dashboard/schedule",
    responses(
        (status = 200, description = "Today's grouped dose checklist", body = ScheduleResponse),
        (status = 401, description = "Not signed in", body = crate::error::ApiError),
    ),
    tag = "Dashboard"
)]
pub(crate) async fn get_schedule(
    State(state): State<AppState>,
    auth: SessionUser,
) -> Json<ScheduleResponse> {
    let date_id = utc_date_id(chrono::Utc::now());

    let supplements = sqlx::query_as::<_, Supplement>(
        "SELECT id, user_id, name, brand, dosage, frequency, schedule_times,
                notes, start_date, created_at, updated_at
         FROM supplements WHERE user_id = $1 ORDER BY created_at DESC LIMIT 50",
    )
    .bind(&auth.uid)
    .fetch_all(&state.db)
    .await
    .unwrap_or_else(|error| {
        tracing::error!(%error, "failed to load supplements for schedule");
        Vec::new()
    });

    let taken_entry_ids: Vec<String> = sqlx::query_scalar(
        "SELECT taken_entry_ids FROM dose_logs WHERE user_id = $1 AND date_id = $2::date",
    )
    .bind(&auth.uid)
    .bind(&date_id)
    .fetch_optional(&state.db)
    .await
    .unwrap_or_else(|error| {
        tracing::error!(%error, "failed to load dose log for schedule");
        None
    })
    .unwrap_or_default();

    Json(ScheduleResponse {
        date_id,
        groups: build_schedule(&supplements),
        taken_entry_ids,
    })
}

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Dashboard summary", body = SummaryResponse),
        (status = 401, description = "Not signed in", body = crate::error::ApiError),
    ),
    tag = "Dashboard"
)]
pub(crate) async fn get_summary(
    State(state): State<AppState>,
    auth: SessionUser,
) -> Json<SummaryResponse> {
    // Count failures degrade to zero.
    let supplement_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM supplements WHERE user_id = $1")
            .bind(&auth.uid)
            .fetch_one(&state.db)
            .await
            .unwrap_or(0);

    Json(SummaryResponse {
        date_id: utc_date_id(chrono::Utc::now()),
        supplement_count,
    })
}
