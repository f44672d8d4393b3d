/// Integration tests for the HTTP API
///
/// Requests are driven through the router with `tower::ServiceExt::oneshot`,
/// no socket is bound.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mh_assistant::{
    api::{build_router, AppState},
    assessment::{AssessmentEngine, APP_TITLE, DISCLAIMER},
    ml::MLConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn setup_app() -> Router {
    let engine = AssessmentEngine::from_config(&MLConfig::default()).unwrap();
    build_router(AppState::new(Arc::new(engine)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(setup_app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_catalog() {
    let (status, body) = send(setup_app(), get("/v1/catalog")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], APP_TITLE);
    assert_eq!(body["disclaimer"], DISCLAIMER);
    assert_eq!(body["severities"], json!(["mild", "moderate", "severe"]));
    assert_eq!(body["categories"].as_array().unwrap().len(), 4);
    assert_eq!(body["categories"][2]["name"], "Perceptual");
    assert_eq!(body["features"].as_array().unwrap().len(), 8);
    assert_eq!(body["features"][0], "anxiety");
}

#[tokio::test]
async fn test_symptoms_for_categories() {
    let (status, body) = send(
        setup_app(),
        get("/v1/catalog/symptoms?categories=Mood,Cognitive"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["symptoms"],
        json!(["anxiety", "depressed_mood", "memory_loss", "paranoia"])
    );
}

#[tokio::test]
async fn test_symptoms_unknown_category() {
    let (status, body) = send(setup_app(), get("/v1/catalog/symptoms?categories=Somatic")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_model() {
    let (status, body) = send(setup_app(), get("/v1/model")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["model_type"], "random_forest");
    assert_eq!(body["classes"].as_array().unwrap().len(), 5);
    assert_eq!(body["encoding"], "severity");
}

#[tokio::test]
async fn test_assessment_with_advisory() {
    let request = post_json(
        "/v1/assessments",
        json!({"symptoms": {"hallucinations": "severe", "paranoia": "moderate"}}),
    );
    let (status, body) = send(setup_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["status"], "scored");
    assert_eq!(body["outcome"]["probabilities"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["outcome"]["advisory"]["rule"],
        "hallucinations_with_paranoia"
    );
    assert_eq!(body["feature_vector"], json!([0, 0, 0, 2, 3, 0, 0, 0]));
    assert_eq!(body["disclaimer"], DISCLAIMER);
}

#[tokio::test]
async fn test_assessment_empty_selection() {
    let (status, body) = send(setup_app(), post_json("/v1/assessments", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["status"], "awaiting_input");
    assert_eq!(
        body["outcome"]["message"],
        "Select at least one symptom to begin."
    );
}

#[tokio::test]
async fn test_assessment_unknown_symptom() {
    let request = post_json("/v1/assessments", json!({"symptoms": {"fever": "mild"}}));
    let (status, body) = send(setup_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn test_assessment_outside_categories() {
    let request = post_json(
        "/v1/assessments",
        json!({"categories": ["Mood"], "symptoms": {"paranoia": "mild"}}),
    );
    let (status, _) = send(setup_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(setup_app(), get("/v1/diagnoses")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_assessment_unknown_severity() {
    let request = post_json(
        "/v1/assessments",
        json!({"symptoms": {"anxiety": "extreme"}}),
    );
    let (status, body) = send(setup_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn test_assessment_truncated_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/assessments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"symptoms": {"anxiety""#))
        .unwrap();
    let (status, body) = send(setup_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_assessment_missing_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/assessments")
        .body(Body::from(r#"{"symptoms": {}}"#))
        .unwrap();
    let (status, body) = send(setup_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
