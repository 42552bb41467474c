//! Store-level tests that need a running Postgres. Ignored by default; run
//! with `cargo test -- --ignored` and a reachable DATABASE_URL.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fortify_server::identity::StaticIdentity;
use fortify_server::routes;
use fortify_server::session::{issue_session_token, SESSION_COOKIE_NAME};
use fortify_server::AppState;

fn app(pool: PgPool) -> Router {
    let base = common::test_state(
        Arc::new(StaticIdentity::accepting(common::TEST_UID)),
        common::TEST_SECRET,
    );
    routes::api_router(AppState { db: pool, ..base })
}

fn request(method: Method, uri: &str, uid: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let token = issue_session_token(uid, common::TEST_SECRET).unwrap();
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[sqlx::test(migrations = "src/db/migrations")]
#[ignore]
async fn first_toggle_creates_the_date_record(pool: PgPool) {
    let app = app(pool.clone());

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/dose-log/2025-03-09/toggle",
            common::TEST_UID,
            Some(serde_json::json!({"entryId": "supp-1:morning"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["taken"], true);

    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT taken_entry_ids FROM dose_logs WHERE user_id = $1 AND date_id = '2025-03-09'",
    )
    .bind(common::TEST_UID)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(ids, vec!["supp-1:morning"]);
}

#[sqlx::test(migrations = "src/db/migrations")]
#[ignore]
async fn double_toggle_restores_original_membership(pool: PgPool) {
    let app = app(pool.clone());
    let toggle = || {
        request(
            Method::POST,
            "/api/dose-log/2025-03-09/toggle",
            common::TEST_UID,
            Some(serde_json::json!({"entryId": "supp-1:bedtime"})),
        )
    };

    let response = app.clone().oneshot(toggle()).await.unwrap();
    assert_eq!(json_body(response).await["taken"], true);

    let response = app.clone().oneshot(toggle()).await.unwrap();
    assert_eq!(json_body(response).await["taken"], false);

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/dose-log/2025-03-09",
            common::TEST_UID,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await["takenEntryIds"],
        serde_json::json!([])
    );
}

#[sqlx::test(migrations = "src/db/migrations")]
#[ignore]
async fn toggle_leaves_other_entries_alone(pool: PgPool) {
    let app = app(pool.clone());
    let toggle = |entry: &str| {
        request(
            Method::POST,
            "/api/dose-log/2025-03-09/toggle",
            common::TEST_UID,
            Some(serde_json::json!({"entryId": entry})),
        )
    };

    app.clone().oneshot(toggle("supp-1:morning")).await.unwrap();
    app.clone().oneshot(toggle("supp-2:morning")).await.unwrap();
    app.clone().oneshot(toggle("supp-1:morning")).await.unwrap();

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/dose-log/2025-03-09",
            common::TEST_UID,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(
        json_body(response).await["takenEntryIds"],
        serde_json::json!(["supp-2:morning"])
    );
}

// The first two toggles of a date race to create its row; neither may
// overwrite the other's entry.
#[sqlx::test(migrations = "src/db/migrations")]
#[ignore]
async fn simultaneous_first_toggles_both_persist(pool: PgPool) {
    let app = app(pool.clone());
    let toggle = |entry: &str| {
        request(
            Method::POST,
            "/api/dose-log/2025-03-09/toggle",
            common::TEST_UID,
            Some(serde_json::json!({"entryId": entry})),
        )
    };

    let (first, second) = tokio::join!(
        app.clone().oneshot(toggle("supp-1:morning")),
        app.clone().oneshot(toggle("supp-2:evening")),
    );
    assert_eq!(first.unwrap().status(), StatusCode::OK);
    assert_eq!(second.unwrap().status(), StatusCode::OK);

    let mut ids: Vec<String> = sqlx::query_scalar(
        "SELECT taken_entry_ids FROM dose_logs WHERE user_id = $1 AND date_id = '2025-03-09'",
    )
    .bind(common::TEST_UID)
    .fetch_one(&pool)
    .await
    .unwrap();
    ids.sort();
    assert_eq!(ids, vec!["supp-1:morning", "supp-2:evening"]);
}

#[sqlx::test(migrations = "src/db/migrations")]
#[ignore]
async fn supplements_are_scoped_to_their_owner(pool: PgPool) {
    let app = app(pool.clone());

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/supplements",
            common::TEST_UID,
            Some(serde_json::json!({
                "name": "Magnesium",
                "scheduleTimes": ["morning", "bedtime"]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/supplements", common::TEST_UID, None))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Magnesium");

    let response = app
        .oneshot(request(Method::GET, "/api/supplements", "someone-else", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await, serde_json::json!([]));
}

#[sqlx::test(migrations = "src/db/migrations")]
#[ignore]
async fn clearing_history_spares_bookmarks(pool: PgPool) {
    let app = app(pool.clone());
    let save = |query: &str| {
        request(
            Method::POST,
            "/api/research/history",
            common::TEST_UID,
            Some(serde_json::json!({
                "query": query,
                "response": "...",
                "category": "dosing"
            })),
        )
    };

    let response = app.clone().oneshot(save("creatine timing")).await.unwrap();
    let kept_id = json_body(response).await["id"].as_str().unwrap().to_string();
    app.clone().oneshot(save("zinc dosing")).await.unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/research/history/{kept_id}/bookmark"),
            common::TEST_UID,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["isBookmarked"], true);

    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            "/api/research/history",
            common::TEST_UID,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["deletedCount"], 1);

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/research/bookmarks",
            common::TEST_UID,
            None,
        ))
        .await
        .unwrap();
    let bookmarks = json_body(response).await;
    assert_eq!(bookmarks.as_array().unwrap().len(), 1);
    assert_eq!(bookmarks[0]["query"], "creatine timing");
}
