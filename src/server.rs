#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! HTTP endpoints for single-task and whole-exam grading.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    grade::Grader,
    types::{
        ExamResult, ExamSubmission, QuestionType, ResponseSubmission, RubricScore, ValidationError,
    },
};

/// Number of tasks in a complete exam.
const EXAM_TASK_COUNT: usize = 4;

/// Failures reported to HTTP clients.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The request is missing fields or has invalid values.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The body is not JSON of the expected shape.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    /// Grading itself failed unexpectedly.
    #[error("Internal server error")]
    Internal,
}

/// JSON body of an error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

/// Shared handler state.
#[derive(Clone)]
struct AppState {
    /// The grading engine.
    grader: Arc<Grader>,
}

/// Builds the router serving the grading endpoints.
pub fn router(grader: Arc<Grader>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/grade", post(grade_response))
        .route("/api/grade/exam", post(grade_exam))
        .with_state(AppState { grader })
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, grader: Arc<Grader>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;
    tracing::info!(%addr, model = grader.model_key(), "grading server listening");

    axum::serve(listener, router(grader))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("Grading server failed")
}

/// Liveness probe.
async fn healthz() -> &'static str {
    "ok"
}

/// Body of a single-task grading request, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeRequest {
    /// Candidate text.
    user_response: Option<String>,
    /// Task type name.
    question_type: Option<String>,
    /// Task instruction.
    prompt:        Option<String>,
}

impl GradeRequest {
    /// Validates a standalone request; the response text must be non-empty.
    fn into_submission(mut self) -> Result<ResponseSubmission, ValidationError> {
        let user_response = self
            .user_response
            .take()
            .filter(|text| !text.is_empty())
            .ok_or(ValidationError::MissingField("userResponse"))?;
        self.build(user_response)
    }

    /// Validates an exam entry; a skipped task may have an empty response.
    fn into_exam_entry(mut self) -> Result<ResponseSubmission, ValidationError> {
        let user_response = self.user_response.take().unwrap_or_default();
        self.build(user_response)
    }

    /// Shared checks on the task type.
    fn build(self, user_response: String) -> Result<ResponseSubmission, ValidationError> {
        let question_type = self
            .question_type
            .filter(|name| !name.trim().is_empty())
            .ok_or(ValidationError::MissingField("questionType"))?
            .parse::<QuestionType>()?;

        Ok(ResponseSubmission::new(
            question_type,
            self.prompt.unwrap_or_default(),
            user_response,
        ))
    }
}

/// Body of a whole-exam grading request, before validation.
#[derive(Debug, Deserialize)]
struct ExamRequest {
    /// Task submissions in exam order.
    responses: Option<Vec<GradeRequest>>,
}

impl ExamRequest {
    /// Validates every entry and rejects an empty exam.
    fn into_exam(self) -> Result<ExamSubmission, ValidationError> {
        let responses = self
            .responses
            .unwrap_or_default()
            .into_iter()
            .map(GradeRequest::into_exam_entry)
            .collect::<Result<Vec<_>, _>>()?;
        ExamSubmission::new(responses)
    }
}

/// `POST /api/grade`
async fn grade_response(
    State(state): State<AppState>,
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> Result<Json<RubricScore>, ApiError> {
    let Json(request) = payload?;
    let submission = request.into_submission().inspect_err(|err| {
        tracing::info!(reason = %err, "rejected grading request");
    })?;

    let span = tracing::info_span!(
        "grade.response",
        request_id = %Uuid::new_v4(),
        question_type = %submission.question_type
    );
    let grader = state.grader.clone();
    let score = tokio::spawn(
        async move { grader.grade_response(&submission).await }.instrument(span),
    )
    .await
    .map_err(|err| {
        tracing::error!(error = %err, "grading task failed");
        ApiError::Internal
    })?;

    Ok(Json(score))
}

/// `POST /api/grade/exam`
async fn grade_exam(
    State(state): State<AppState>,
    payload: Result<Json<ExamRequest>, JsonRejection>,
) -> Result<Json<ExamResult>, ApiError> {
    let Json(request) = payload?;
    let exam = request.into_exam().inspect_err(|err| {
        tracing::info!(reason = %err, "rejected exam request");
    })?;

    if exam.len() != EXAM_TASK_COUNT {
        tracing::warn!(
            responses = exam.len(),
            expected = EXAM_TASK_COUNT,
            "exam does not contain the usual number of tasks"
        );
    }

    let span = tracing::info_span!(
        "grade.exam",
        request_id = %Uuid::new_v4(),
        responses = exam.len()
    );
    let grader = state.grader.clone();
    let result = tokio::spawn(async move { grader.grade_exam(&exam).await }.instrument(span))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "exam grading task failed");
            ApiError::Internal
        })?;

    Ok(Json(result))
}
