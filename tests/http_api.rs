use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use codecase_backend::routes::build_router;
use codecase_backend::state::{AppState, Catalog};

fn app() -> Router {
    let state = Arc::new(AppState::from_catalog(Catalog::build(None)));
    build_router(state, "./static")
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let resp = app().oneshot(req).await.expect("router response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1 << 20).await.expect("body bytes");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn lists_seed_cases_with_scores() {
    let (status, body) = send(get("/api/v1/cases")).await;
    assert_eq!(status, StatusCode::OK);
    let cases = body.as_array().expect("array");
    let influencer = cases
        .iter()
        .find(|c| c["id"] == "the-vanishing-influencer")
        .expect("seed case");
    assert_eq!(influencer["missionCount"], 2);
    assert_eq!(influencer["maxScore"], 30);
}

#[tokio::test]
async fn case_detail_and_unknown_case() {
    let (status, body) = send(get("/api/v1/cases/the-forgotten-newsroom")).await;
    assert_eq!(status, StatusCode::OK);
    let mission = &body["missions"][0];
    assert_eq!(mission["id"], "center-of-attention");
    assert!(mission["starterHtml"].as_str().unwrap().contains("<center>"));
    assert_eq!(mission["conditions"][0]["points"], 10);

    let (status, body) = send(get("/api/v1/cases/ghost-ship")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn validate_scores_a_submission() {
    let (status, body) = send(post_json(
        "/api/v1/validate",
        json!({
            "identifier": "insta-clue",
            "html": "<p id=\"insta-clue\">Posted from the old lighthouse at 21:40</p>",
            "css": "#insta-clue { display: block; }"
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["missionId"], "insta-clue");
    assert_eq!(body["isComplete"], true);
    assert_eq!(body["score"], 10);
    assert_eq!(body["maxScore"], 10);
    assert_eq!(body["feedback"][0]["passed"], true);
}

#[tokio::test]
async fn validate_reports_unmet_conditions() {
    let (status, body) = send(post_json(
        "/api/v1/validate",
        json!({ "identifier": "insta-clue", "html": "", "css": "#insta-clue { display:none; display:block }" }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isComplete"], false);
    assert_eq!(body["score"], 0);
    assert!(body["feedback"][0]["message"].as_str().unwrap().contains("display: none"));
}

#[tokio::test]
async fn validate_with_prior_document() {
    let (status, body) = send(post_json(
        "/api/v1/validate",
        json!({
            "identifier": "center-of-attention",
            "html": "<header class=\"masthead\">Breaking news</header>",
            "css": ".masthead { text-align: center }",
            "priorHtml": "<center>Breaking news</center>"
        }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isComplete"], true);
}

#[tokio::test]
async fn unknown_identifier_is_a_distinct_404() {
    let (status, body) = send(post_json(
        "/api/v1/validate",
        json!({ "identifier": "case-404", "html": "<p>hi</p>", "css": "" }),
    ))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["message"].as_str().unwrap().contains("case-404"));
}

#[tokio::test]
async fn hint_names_the_next_condition() {
    let (status, body) = send(post_json(
        "/api/v1/hint",
        json!({ "identifier": "font-of-lies", "html": "<p>The ransom note says <span>meet at midnight</span>.</p>", "css": "" }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().starts_with("Clue: Add color: red to .warning"));
}
