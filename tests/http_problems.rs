mod support;

use axum::{
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use rstest::rstest;
use serde_json::json;
use support::{app, app_with_routes, body_json, empty_request, json_request, send};
use taskhub::problem::PROBLEM_CONTENT_TYPE;
use taskhub::AppState;

#[tokio::test]
async fn unmatched_route_is_not_found_problem() {
    let app = app();
    let res = send(&app, empty_request("GET", "/nowhere", None)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.headers()[header::CONTENT_TYPE], PROBLEM_CONTENT_TYPE);
    let request_id = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(!request_id.is_empty());

    let body = body_json(res).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["instance"], "/nowhere");
    assert_eq!(body["requestId"], request_id.as_str());
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn client_request_id_is_echoed() {
    let app = app();
    let req = Request::builder()
        .uri("/nowhere")
        .header("x-request-id", "client-abc")
        .body(axum::body::Body::empty())
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.headers()["x-request-id"], "client-abc");
    assert_eq!(body_json(res).await["requestId"], "client-abc");
}

async fn boom() -> &'static str {
    panic!("secret detail")
}

#[tokio::test]
async fn panic_becomes_internal_problem_without_leaking() {
    let app = app_with_routes(Router::<AppState>::new().route("/boom", get(boom)));
    let res = send(&app, empty_request("GET", "/boom", None)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()[header::CONTENT_TYPE], PROBLEM_CONTENT_TYPE);
    let body = body_json(res).await;
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert!(!body.to_string().contains("secret detail"));
}

#[tokio::test]
async fn tasks_require_a_session() {
    let app = app();
    let res = send(&app, empty_request("GET", "/tasks", None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(res).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["instance"], "/tasks");
}

#[tokio::test]
async fn forged_session_is_rejected() {
    let app = app();
    let res = send(&app, empty_request("GET", "/tasks", Some("token=not-a-jwt"))).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

// statuses outside the closed code set degrade to internal
#[tokio::test]
async fn method_not_allowed_degrades_to_internal() {
    let app = app();
    let res = send(&app, empty_request("PUT", "/health", None)).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(res).await["code"], "INTERNAL_SERVER_ERROR");
}

#[tokio::test]
async fn oversized_body_degrades_to_internal() {
    let app = app();
    let password = "x".repeat(128 * 1024);
    let res = send(
        &app,
        json_request("POST", "/register", json!({"email": "big@example.com", "password": password}), None),
    )
    .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[rstest]
#[case("not json")]
#[case("{\"email\": ")]
#[tokio::test]
async fn malformed_json_is_bad_request(#[case] raw: &str) {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(raw.to_string()))
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn non_object_body_is_unprocessable() {
    let app = app();
    let res = send(&app, json_request("POST", "/login", json!([1, 2]), None)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(res).await;
    assert_eq!(body["errors"][0]["source"]["pointer"], "/body");
    assert_eq!(body["errors"][0]["detail"], "must be a JSON object");
}

#[tokio::test]
async fn success_responses_pass_through() {
    let app = app();
    let res = send(&app, empty_request("GET", "/", None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({"message": "Tasks API"}));

    let res = send(&app, empty_request("GET", "/health", None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "ok");
}
