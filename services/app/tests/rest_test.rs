//! Exercises the REST surface through the router without binding a socket.

mod common;

use app_lib::web;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use common::{catalogue, start, Harness};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(h: &Harness) -> Router {
    web::router(h.runtime.state.clone())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn ids(sessions: &Value) -> Vec<i64> {
    sessions
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn categories_are_listed_in_display_order() {
    let h = start(catalogue());
    let (status, body) = send(app(&h), Method::GET, "/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["categories"],
        json!(["Yoga", "Meditation", "Massage", "Mindfulness", "Swimming", "Dance", "Fitness"])
    );
}

#[tokio::test]
async fn list_screen_starts_loading() {
    let h = start(catalogue());
    let (status, body) = send(app(&h), Method::GET, "/screens/sessions", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "loading");
    assert_eq!(body["search_active"], false);
}

#[tokio::test]
async fn load_returns_settled_list() {
    let h = start(catalogue());
    let (status, body) = send(app(&h), Method::POST, "/screens/sessions/load", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "success");
    assert_eq!(ids(&body["state"]["data"]), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn load_failure_is_a_screen_state_not_an_http_error() {
    let h = start(catalogue());
    h.source.fail_with(Some("timeout"));
    let (status, body) = send(app(&h), Method::POST, "/screens/sessions/load", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "error");
    assert_eq!(body["state"]["data"], "Failed to fetch sessions: timeout");
}

#[tokio::test]
async fn filter_by_category_label_is_case_insensitive() {
    let h = start(catalogue());
    send(app(&h), Method::POST, "/screens/sessions/load", None).await;

    let (status, body) = send(
        app(&h),
        Method::PUT,
        "/screens/sessions/filter",
        Some(json!({ "category": "YOGA", "query": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filter"]["category"], "Yoga");
    assert_eq!(ids(&body["state"]["data"]), vec![1, 4]);
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let h = start(catalogue());
    let (status, _) = send(
        app(&h),
        Method::PUT,
        "/screens/sessions/filter",
        Some(json!({ "category": "Pilates" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_toggle_flips_the_flag() {
    let h = start(catalogue());
    let (_, opened) = send(app(&h), Method::POST, "/screens/sessions/search/toggle", None).await;
    assert_eq!(opened["search_active"], true);

    let (_, closed) = send(app(&h), Method::POST, "/screens/sessions/search/toggle", None).await;
    assert_eq!(closed["search_active"], false);
}

#[tokio::test]
async fn favorite_toggle_feeds_the_favorites_screen() {
    let h = start(catalogue());
    send(app(&h), Method::POST, "/screens/sessions/load", None).await;

    let (status, body) = send(app(&h), Method::POST, "/sessions/2/favorite", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "session_id": 2, "is_favorite": true }));

    let (_, favorites) = send(app(&h), Method::GET, "/screens/favorites", None).await;
    assert_eq!(ids(&favorites["sessions"]), vec![2]);

    let (_, filtered) = send(
        app(&h),
        Method::PUT,
        "/screens/favorites/filter",
        Some(json!({ "category": "Massage" })),
    )
    .await;
    assert!(filtered["sessions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn favorite_storage_failure_is_a_server_error() {
    let h = start(catalogue());
    h.prefs.fail_writes(true);

    let (status, _) = send(app(&h), Method::POST, "/sessions/1/favorite", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn detail_load_settles_on_the_session() {
    let h = start(catalogue());
    let (status, body) = send(app(&h), Method::POST, "/screens/detail/3/load", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], 3);
    assert_eq!(body["state"]["status"], "success");
    assert_eq!(body["state"]["data"]["title"], "Deep Tissue Basics");

    let (_, current) = send(app(&h), Method::GET, "/screens/detail", None).await;
    assert_eq!(current, body);
}

#[tokio::test]
async fn missing_detail_is_an_error_state() {
    let h = start(catalogue());
    let (status, body) = send(app(&h), Method::POST, "/screens/detail/42/load", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["status"], "error");
}

#[tokio::test]
async fn requests_after_shutdown_are_unavailable() {
    let h = start(catalogue());
    let router = app(&h);
    let Harness { runtime, .. } = h;
    runtime.shutdown().await.unwrap();

    let (status, _) = send(router, Method::POST, "/sessions/1/favorite", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let h = start(catalogue());
    let (status, body) = send(app(&h), Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/screens/sessions/load"].is_object());
    assert!(body["paths"]["/sessions/{id}/favorite"].is_object());
}
