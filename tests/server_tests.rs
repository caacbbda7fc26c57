use std::{net::SocketAddr, sync::Arc};

use cefr_grader::{
    CefrBand, ExamResult, Grader, QuestionType, RubricScore,
    gateway::{ChunkStream, GatewayClient, GatewayError, GenerationRequest, TextGenerator},
    heuristic::grade_heuristic,
    models::{DEFAULT_GRADING_MODEL, ModelRegistry},
    server::{ErrorBody, router},
    tasks::SPEAKING_PLACEHOLDER,
};
use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Serves the router on an ephemeral port with no gateway credentials, so
/// every grade comes from the heuristic path.
async fn spawn_server() -> SocketAddr {
    spawn_server_with(Arc::new(GatewayClient::new(
        None,
        reqwest::Client::new(),
        ModelRegistry,
    )))
    .await
}

/// Serves the router on an ephemeral port backed by `generator`.
async fn spawn_server_with(generator: Arc<dyn TextGenerator>) -> SocketAddr {
    let grader = Grader::builder()
        .generator(generator)
        .model_key(DEFAULT_GRADING_MODEL)
        .build();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(Arc::new(grader))).await.unwrap();
    });
    addr
}

/// Backend that panics as soon as a grade is attempted.
struct PanickingGenerator;

impl TextGenerator for PanickingGenerator {
    fn open_stream(
        &self,
        _request: GenerationRequest,
    ) -> BoxFuture<'_, Result<ChunkStream, GatewayError>> {
        panic!("grading backend crashed")
    }
}

async fn post(addr: SocketAddr, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn healthz_responds() {
    let addr = spawn_server().await;
    let response = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn grades_single_response() {
    let addr = spawn_server().await;
    let text = "I am sorry for the delay due to a technical issue. We will deliver by Friday.";
    let response = post(
        addr,
        "/api/grade",
        json!({ "userResponse": text, "questionType": "email", "prompt": "Write an email" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    for field in ["fluency", "lexical", "grammar", "task", "feedback"] {
        assert!(body.get(field).is_some(), "missing {field}");
    }

    let score: RubricScore = serde_json::from_value(body).unwrap();
    assert_eq!(score, grade_heuristic(text, QuestionType::Email));
    assert_eq!(score.task, 5.0);
}

#[tokio::test]
async fn prompt_is_optional() {
    let addr = spawn_server().await;
    let response = post(
        addr,
        "/api/grade",
        json!({ "userResponse": SPEAKING_PLACEHOLDER, "questionType": "speaking" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_user_response_is_rejected() {
    let addr = spawn_server().await;
    let response = post(addr, "/api/grade", json!({ "questionType": "email" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error.contains("userResponse"));
}

#[tokio::test]
async fn empty_user_response_is_rejected() {
    let addr = spawn_server().await;
    let response = post(
        addr,
        "/api/grade",
        json!({ "userResponse": "", "questionType": "email" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_question_type_is_rejected() {
    let addr = spawn_server().await;
    let response = post(addr, "/api/grade", json!({ "userResponse": "Hello." })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error.contains("questionType"));
}

#[tokio::test]
async fn unknown_question_type_is_rejected() {
    let addr = spawn_server().await;
    let response = post(
        addr,
        "/api/grade",
        json!({ "userResponse": "Hello.", "questionType": "essay" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error.contains("essay"));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let addr = spawn_server().await;
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/grade"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_exam_is_rejected() {
    let addr = spawn_server().await;
    let response = post(addr, "/api/grade/exam", json!({ "responses": [] })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error, "Missing or invalid exam responses");
}

#[tokio::test]
async fn missing_exam_responses_are_rejected() {
    let addr = spawn_server().await;
    let response = post(addr, "/api/grade/exam", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exam_entry_with_bad_type_is_rejected() {
    let addr = spawn_server().await;
    let response = post(
        addr,
        "/api/grade/exam",
        json!({ "responses": [{ "questionType": "poetry", "userResponse": "roses" }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn grades_minimal_exam() {
    let addr = spawn_server().await;
    let response = post(
        addr,
        "/api/grade/exam",
        json!({
            "responses": [
                { "questionType": "email", "prompt": "", "userResponse": "ok thanks" },
                { "questionType": "summarize", "prompt": "", "userResponse": "not sure" },
                { "questionType": "dictation", "prompt": "", "userResponse": "" },
                { "questionType": "speaking", "prompt": "", "userResponse": SPEAKING_PLACEHOLDER },
            ]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["overallScore"], "A1");

    let result: ExamResult = serde_json::from_value(body).unwrap();
    assert_eq!(result.overall_score, CefrBand::A1);
    assert!(!result.explanation.is_empty());
}

#[tokio::test]
async fn crashed_grading_returns_500() {
    let addr = spawn_server_with(Arc::new(PanickingGenerator)).await;
    let response = post(
        addr,
        "/api/grade",
        json!({ "userResponse": "Hello.", "questionType": "email" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error, "Internal server error");
}

#[tokio::test]
async fn crashed_exam_grading_returns_500() {
    let addr = spawn_server_with(Arc::new(PanickingGenerator)).await;
    let response = post(
        addr,
        "/api/grade/exam",
        json!({ "responses": [{ "questionType": "email", "userResponse": "Hello." }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal server error" }));
}
