use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use futures::StreamExt;
use uuid::Uuid;

use crate::error::{err, ApiError};
use crate::middleware::auth::SessionUser;
use crate::models::research::{
    BookmarkDetailsRequest, BookmarkToggleResponse, BookmarkedResearch, ClearHistoryResponse,
    HistoryQuery, ResearchCategory, ResearchRequest, SaveSearchRequest, SavedSearchResponse,
    SearchHistoryItem, SearchRecord, SearchStatsResponse,
};
use crate::prompts::system_prompt;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(research))
        .route("/history", get(get_history).post(save_search).delete(clear_history))
        .route("/history/{id}", delete(delete_search))
        .route(
            "/history/{id}/bookmark",
            post(toggle_bookmark).put(update_bookmark_details),
        )
        .route("/bookmarks", get(get_bookmarks))
        .route("/stats", get(get_stats))
}

const SEARCH_COLUMNS: &str = "id, user_id, query, response, category, created_at, \
                              is_bookmarked, bookmarked_at, title, notes, updated_at";

/// Proxies the prompt to the LLM with a category-specific system prompt and
/// streams plain text back. The server keeps no state past the response
/// stream; client-side aborts have nothing to undo.
#[utoipa::path(
    post,
    path = "/api/research",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Streamed completion text", content_type = "text/plain"),
        (status = 400, description = "Empty prompt", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 500, description = "Upstream failure", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn research(
    State(state): State<AppState>,
    _auth: SessionUser,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let Json(req) =
        payload.map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid request body"))?;
    if req.prompt.trim().is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "Prompt is required"));
    }

    let category = ResearchCategory::parse_or_general(req.category.as_deref());
    let upstream = || err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch supplement information");

    let request = CreateChatCompletionRequestArgs::default()
        .model(&state.research_model)
        .temperature(0.7)
        .messages([
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt(category))
                .build()
                .map_err(|_| upstream())?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(req.prompt)
                .build()
                .map_err(|_| upstream())?
                .into(),
        ])
        .build()
        .map_err(|_| upstream())?;

    let mut stream = state
        .llm
        .chat()
        .create_stream(request)
        .await
        .map_err(|error| {
            tracing::error!(%error, "completion request failed");
            upstream()
        })?;

    let body = Body::from_stream(async_stream::stream! {
        while let Some(result) = stream.next().await {
            match result {
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .first()
                        .and_then(|choice| choice.delta.content.clone());
                    if let Some(text) = content {
                        yield Ok::<_, std::io::Error>(text);
                    }
                }
                Err(error) => {
                    // Mid-stream failure: the status line is already sent,
                    // so the stream just ends early.
                    tracing::error!(%error, "completion stream failed");
                    break;
                }
            }
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body)
        .map_err(|_| upstream())
}

#[utoipa::path(
    post,
    path = "/api/research/history",
    request_body = SaveSearchRequest,
    responses(
        (status = 201, description = "Search saved", body = SavedSearchResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn save_search(
    State(state): State<AppState>,
    auth: SessionUser,
    payload: Result<Json<SaveSearchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedSearchResponse>), (StatusCode, Json<ApiError>)> {
    let Json(req) =
        payload.map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid request body"))?;
    if req.query.trim().is_empty() {
        return Err(err(StatusCode::BAD_REQUEST, "Query is required"));
    }

    let category = ResearchCategory::parse_or_general(req.category.as_deref());

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO searches (user_id, query, response, category)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(&auth.uid)
    .bind(&req.query)
    .bind(&req.response)
    .bind(category.as_str())
    .fetch_one(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save search"))?;

    Ok((StatusCode::CREATED, Json(SavedSearchResponse { id })))
}

#[utoipa::path(
    get,
    path = "/api/research/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Search history, newest first", body = Vec<SearchHistoryItem>),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn get_history(
    State(state): State<AppState>,
    auth: SessionUser,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<SearchHistoryItem>> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let rows = sqlx::query_as::<_, SearchRecord>(&format!(
        "SELECT {SEARCH_COLUMNS} FROM searches
         WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    ))
    .bind(&auth.uid)
    .bind(limit)
    .fetch_all(&state.db)
    .await;

    // History fetch failures degrade to an empty list rather than failing
    // the page.
    match rows {
        Ok(rows) => Json(rows.into_iter().map(SearchHistoryItem::from).collect()),
        Err(error) => {
            tracing::error!(%error, "failed to load search history");
            Json(Vec::new())
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/research/history/{id}",
    params(("id" = Uuid, Path, description = "Search UUID")),
    responses(
        (status = 204, description = "Search deleted"),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn delete_search(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = sqlx::query("DELETE FROM searches WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(&auth.uid)
        .execute(&state.db)
        .await
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?;

    if result.rows_affected() == 0 {
        return Err(err(StatusCode::NOT_FOUND, "Search not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes non-bookmarked history; bookmarks survive a clear.
#[utoipa::path(
    delete,
    path = "/api/research/history",
    responses(
        (status = 200, description = "Non-bookmarked history cleared", body = ClearHistoryResponse),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn clear_history(
    State(state): State<AppState>,
    auth: SessionUser,
) -> Result<Json<ClearHistoryResponse>, (StatusCode, Json<ApiError>)> {
    let result = sqlx::query("DELETE FROM searches WHERE user_id = $1 AND is_bookmarked = FALSE")
        .bind(&auth.uid)
        .execute(&state.db)
        .await
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear history"))?;

    Ok(Json(ClearHistoryResponse {
        deleted_count: result.rows_affected(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/research/history/{id}/bookmark",
    params(("id" = Uuid, Path, description = "Search UUID")),
    responses(
        (status = 200, description = "New bookmark state", body = BookmarkToggleResponse),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn toggle_bookmark(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookmarkToggleResponse>, (StatusCode, Json<ApiError>)> {
    let is_bookmarked: Option<bool> = sqlx::query_scalar(
        "UPDATE searches
         SET is_bookmarked = NOT is_bookmarked,
             bookmarked_at = CASE WHEN is_bookmarked THEN NULL ELSE NOW() END
         WHERE id = $1 AND user_id = $2
         RETURNING is_bookmarked",
    )
    .bind(id)
    .bind(&auth.uid)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?;

    match is_bookmarked {
        Some(is_bookmarked) => Ok(Json(BookmarkToggleResponse { is_bookmarked })),
        None => Err(err(StatusCode::NOT_FOUND, "Search not found")),
    }
}

#[utoipa::path(
    put,
    path = "/api/research/history/{id}/bookmark",
    params(("id" = Uuid, Path, description = "Search UUID")),
    request_body = BookmarkDetailsRequest,
    responses(
        (status = 204, description = "Bookmark details updated"),
        (status = 400, description = "Invalid request body", body = ApiError),
        (status = 401, description = "Not signed in", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn update_bookmark_details(
    State(state): State<AppState>,
    auth: SessionUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<BookmarkDetailsRequest>, JsonRejection>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let Json(req) =
        payload.map_err(|_| err(StatusCode::BAD_REQUEST, "Invalid request body"))?;
    let result = sqlx::query(
        "UPDATE searches SET title = $3, notes = $4, updated_at = NOW()
         WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(&auth.uid)
    .bind(&req.title)
    .bind(&req.notes)
    .execute(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?;

    if result.rows_affected() == 0 {
        return Err(err(StatusCode::NOT_FOUND, "Search not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/research/bookmarks",
    responses(
        (status = 200, description = "Bookmarked research, newest bookmark first", body = Vec<BookmarkedResearch>),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn get_bookmarks(
    State(state): State<AppState>,
    auth: SessionUser,
) -> Json<Vec<BookmarkedResearch>> {
    let rows = sqlx::query_as::<_, SearchRecord>(&format!(
        "SELECT {SEARCH_COLUMNS} FROM searches
         WHERE user_id = $1 AND is_bookmarked = TRUE
         ORDER BY bookmarked_at DESC LIMIT 50",
    ))
    .bind(&auth.uid)
    .fetch_all(&state.db)
    .await;

    match rows {
        Ok(rows) => Json(rows.into_iter().map(BookmarkedResearch::from).collect()),
        Err(error) => {
            tracing::error!(%error, "failed to load bookmarks");
            Json(Vec::new())
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/research/stats",
    responses(
        (status = 200, description = "Search totals and per-category counts", body = SearchStatsResponse),
        (status = 401, description = "Not signed in", body = ApiError),
    ),
    tag = "Research"
)]
pub(crate) async fn get_stats(
    State(state): State<AppState>,
    auth: SessionUser,
) -> Json<SearchStatsResponse> {
    let mut category_counts: std::collections::BTreeMap<String, i64> = ResearchCategory::ALL
        .into_iter()
        .map(|c| (c.as_str().to_string(), 0))
        .collect();

    let rows: Result<Vec<(String, i64, i64)>, _> = sqlx::query_as(
        "SELECT category, COUNT(*), COUNT(*) FILTER (WHERE is_bookmarked)
         FROM searches WHERE user_id = $1 GROUP BY category",
    )
    .bind(&auth.uid)
    .fetch_all(&state.db)
    .await;

    let mut total_searches = 0;
    let mut total_bookmarks = 0;
    match rows {
        Ok(rows) => {
            for (category, count, bookmarks) in rows {
                total_searches += count;
                total_bookmarks += bookmarks;
                let key = ResearchCategory::parse_or_general(Some(&category))
                    .as_str()
                    .to_string();
                *category_counts.entry(key).or_insert(0) += count;
            }
        }
        Err(error) => {
            // Stats degrade to zeroes.
            tracing::error!(%error, "failed to load search stats");
        }
    }

    Json(SearchStatsResponse {
        total_searches,
        total_bookmarks,
        category_counts,
    })
}
