//! HTTP error mapping.
//!
//! Validation failures become `400 {"errors": [...]}`, missing quizzes
//! `404 {"error": ...}`, and everything else a generic `500`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use quizbank_core::QuizServiceError;
use serde_json::json;

/// Use-case name used in the generic 500 message ("... while {action} the quiz").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Creating,
    Retrieving,
    Updating,
    Deleting,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Retrieving => "retrieving",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(Vec<String>),
    NotFound(String),
    Internal(Action),
}

impl AppError {
    /// Logs a failure that has no service-side log line yet.
    pub fn internal(action: Action, err: impl std::fmt::Display) -> Self {
        error!(
            "event=request_failed module=server status=error action={} error={}",
            action.as_str(),
            err
        );
        Self::Internal(action)
    }

    pub fn from_service(action: Action, err: QuizServiceError) -> Self {
        match err {
            QuizServiceError::Validation(err) => Self::BadRequest(
                err.messages()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            ),
            // Logged by the service.
            QuizServiceError::Storage(_) => Self::Internal(action),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(
            "event=request_rejected module=server status=bad_request reason=json error={}",
            rejection.body_text()
        );
        Self::BadRequest(vec![rejection.body_text()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            Self::NotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("Quiz with ID {id} not found") })),
            )
                .into_response(),
            Self::Internal(action) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("An error occurred while {} the quiz", action.as_str())
                })),
            )
                .into_response(),
        }
    }
}
