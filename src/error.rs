//! Error taxonomy for evaluation, external grading and progress tracking.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

use crate::domain::Phase;

/// Rejections that happen before anything is scored.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
  #[error("Missing required fields: prompt and phase")]
  MissingFields,

  #[error("Prompt text is required")]
  EmptyText,

  #[error("Invalid phase '{0}'. Must be one of: detailed, concise, creative")]
  UnknownPhase(String),

  /// Every validator message, so the learner can fix all of them at once.
  #[error("Validation failed")]
  Validation(Vec<String>),
}

impl IntoResponse for EvaluateError {
  fn into_response(self) -> Response {
    let body = match &self {
      EvaluateError::Validation(details) => json!({ "error": self.to_string(), "details": details }),
      _ => json!({ "error": self.to_string() }),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
  }
}

/// Why an external grade was not trusted.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
  #[error("grader request failed: {0}")]
  Transport(String),

  #[error("grader HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("grader returned malformed JSON: {0}")]
  Parse(String),

  #[error("criterion {criterion} out of range: {value}")]
  CriterionOutOfRange { criterion: &'static str, value: f64 },

  #[error("deduction '{reason}' has positive amount {amount}")]
  PositiveDeduction { reason: String, amount: f64 },

  #[error("deduction with empty reason")]
  EmptyDeductionReason,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ProgressError {
  #[error("Phase {0} is locked")]
  PhaseLocked(Phase),

  #[error("Evaluation {0} not found")]
  EvaluationNotFound(String),
}

impl IntoResponse for ProgressError {
  fn into_response(self) -> Response {
    let status = match self {
      ProgressError::PhaseLocked(_) => StatusCode::FORBIDDEN,
      ProgressError::EvaluationNotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

/// Any failure a handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error(transparent)]
  Evaluate(#[from] EvaluateError),

  #[error(transparent)]
  Progress(#[from] ProgressError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Evaluate(e) => e.into_response(),
      ApiError::Progress(e) => e.into_response(),
    }
  }
}
