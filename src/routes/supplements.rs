use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::error::{err, ApiError};
use crate::middleware::auth::SessionUser;
use crate::models::supplement::{Supplement, SupplementInput, SupplementResponse};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_supplements).post(create_supplement))
        .route(
            "/{id}",
            get(get_supplement)
                .put(update_supplement)
                .delete(delete_supplement),
        )
}

fn decode_rows(rows: Vec<Supplement>) -> Vec<SupplementResponse> {
    // Rows that fail the typed decode are logged and skipped; reads degrade
    // rather than failing the whole listing.
    rows.into_iter()
        .filter_map(|row| match SupplementResponse::try_from(row) {
            Ok(supplement) => Some(supplement),
            Err(error) => {
                tracing::warn!(%error, "skipping undecodable supplement row");
                None
            }
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/supplements",
    responses(
        (status = 200, description = "The user's supplements, newest first", body = Vec<SupplementResponse>),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "Supplements"
)]
pub(crate) async fn list_supplements(
    State(state): State<AppState>,
    auth: SessionUser,
) -> Result<Json<Vec<SupplementResponse>>, (StatusCode, Json<ApiError>)> {
    let rows = sqlx::query_as::<_, Supplement>(
        "SELECT id, user_id, name, brand, dosage, frequency, schedule_times,
                notes, start_date, created_at, updated_at
         FROM supplements WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(&auth.uid)
    .fetch_all(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?;

    Ok(Json(decode_rows(rows)))
}

#[utoipa::path(
    post,
    path = "/api/supplements",
    request_body = SupplementInput,
    responses(
        (status = 201, description = "Supplement created", body = SupplementResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "Supplements"
)]
pub(crate) async fn create_supplement(
    State(state): State<AppState>,
    auth: SessionUser,
    payload: Result<Json<SupplementInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SupplementResponse>), (StatusCode, Json<ApiError>)> {
    let Json(req) =
        payload.map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid request body"))?;
    let (name, schedule_times) = req
        .validate()
        .map_err(|msg| err(StatusCode::BAD_REQUEST, msg))?;

    let row = sqlx::query_as::<_, Supplement>(
        "INSERT INTO supplements
             (user_id, name, brand, dosage, frequency, schedule_times, notes, start_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, user_id, name, brand, dosage, frequency, schedule_times,
                   notes, start_date, created_at, updated_at",
    )
    .bind(&auth.uid)
    .bind(&name)
    .bind(&req.brand)
    .bind(&req.dosage)
    .bind(&req.frequency)
    .bind(&schedule_times)
    .bind(&req.notes)
    .bind(req.start_date)
    .fetch_one(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create supplement"))?;

    let supplement = SupplementResponse::try_from(row)
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create supplement"))?;
    Ok((StatusCode::CREATED, Json(supplement)))
}

#[utoipa::path(
    get,
    path = "/api/supplements/{id}",
    params(("id" = Uuid, Path, description = "Supplement UUID")),
    responses(
        (status = 200, description = "The supplement", body = SupplementResponse),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
    ),
    tag = "Supplements"
)]
pub(crate) async fn get_supplement(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplementResponse>, (StatusCode, Json<ApiError>)> {
    let row = sqlx::query_as::<_, Supplement>(
        "SELECT id, user_id, name, brand, dosage, frequency, schedule_times,
                notes, start_date, created_at, updated_at
         FROM supplements WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(&auth.uid)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
    .ok_or_else(|| err(StatusCode::NOT_FOUND, "Supplement not found"))?;

    let supplement = SupplementResponse::try_from(row).map_err(|error| {
        tracing::warn!(%error, "undecodable supplement row");
        err(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
    })?;
    Ok(Json(supplement))
}

#[utoipa::path(
    put,
    path = "/api/supplements/{id}",
    params(("id" = Uuid, Path, description = "Supplement UUID")),
    request_body = SupplementInput,
    responses(
        (status = 200, description = "Supplement updated", body = SupplementResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
    ),
    tag = "Supplements"
)]
pub(crate) async fn update_supplement(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<SupplementInput>, JsonRejection>,
) -> Result<Json<SupplementResponse>, (StatusCode, Json<ApiError>)> {
    let Json(req) =
        payload.map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid request body"))?;
    let (name, schedule_times) = req
        .validate()
        .map_err(|msg| err(StatusCode::BAD_REQUEST, msg))?;

    let row = sqlx::query_as::<_, Supplement>(
        "UPDATE supplements
         SET name = $3, brand = $4, dosage = $5, frequency = $6,
             schedule_times = $7, notes = $8, start_date = $9, updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING id, user_id, name, brand, dosage, frequency, schedule_times,
                   notes, start_date, created_at, updated_at",
    )
    .bind(id)
    .bind(&auth.uid)
    .bind(&name)
    .bind(&req.brand)
    .bind(&req.dosage)
    .bind(&req.frequency)
    .bind(&schedule_times)
    .bind(&req.notes)
    .bind(req.start_date)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update supplement"))?
    .ok_or_else(|| err(StatusCode::NOT_FOUND, "Supplement not found"))?;

    let supplement = SupplementResponse::try_from(row)
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update supplement"))?;
    Ok(Json(supplement))
}

#[utoipa::path(
    delete,
    path = "/api/supplements/{id}",
    params(("id" = Uuid, Path, description = "Supplement UUID")),
    responses(
        (status = 204, description = "Supplement deleted"),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
    ),
    tag = "Supplements"
)]
pub(crate) async fn delete_supplement(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = sqlx::query("DELETE FROM supplements WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(&auth.uid)
        .execute(&state.db)
        .await
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?;

    if result.rows_affected() == 0 {
        return Err(err(StatusCode::NOT_FOUND, "Supplement not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
