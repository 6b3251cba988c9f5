//! Minimal OpenAI-compatible client acting as the external grader.
//!
//! We only call chat.completions with a strict JSON-object response format.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//! Whatever comes back is checked by `check_grade` before the engine trusts it.
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::{Criterion, CriterionScores, Deduction, ExternalGrade, Feedback, Phase, CRITERION_MAX};
use crate::error::GradeError;
use crate::util::{fill_template, trunc_for_log};

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct Grader {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  /// Pause between failed attempts.
  pub retry_delay: Duration,
}

/// Wire shape of a grade. Unlike `ExternalGrade` nothing here is optional:
/// a missing list is a malformed grade, not an empty one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeWire {
  criteria_scores: CriteriaWire,
  deductions: Vec<Deduction>,
  feedback: FeedbackWire,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriteriaWire {
  task_clarity: f64,
  subject_specificity: f64,
  completeness: f64,
  context: f64,
}

#[derive(Deserialize)]
struct FeedbackWire {
  strengths: Vec<String>,
  improvements: Vec<String>,
  suggestions: Vec<String>,
  examples: Vec<String>,
}

impl From<GradeWire> for ExternalGrade {
  fn from(w: GradeWire) -> Self {
    ExternalGrade {
      criteria_scores: CriterionScores::new(
        w.criteria_scores.task_clarity,
        w.criteria_scores.subject_specificity,
        w.criteria_scores.completeness,
        w.criteria_scores.context,
      ),
      deductions: w.deductions,
      feedback: Feedback {
        strengths: w.feedback.strengths,
        improvements: w.feedback.improvements,
        suggestions: w.feedback.suggestions,
        examples: w.feedback.examples,
      },
    }
  }
}

/// Parse a raw grader reply into a grade, enforcing the full shape.
pub fn parse_grade(raw: &str) -> Result<ExternalGrade, GradeError> {
  let wire: GradeWire = serde_json::from_str(raw).map_err(|e| GradeError::Parse(e.to_string()))?;
  let grade = ExternalGrade::from(wire);
  check_grade(&grade)?;
  Ok(grade)
}

/// Range and sign checks. A grade that fails here is never used for scoring.
pub fn check_grade(grade: &ExternalGrade) -> Result<(), GradeError> {
  for c in Criterion::ALL {
    let value = grade.criteria_scores.get(c);
    if !value.is_finite() || !(0.0..=CRITERION_MAX).contains(&value) {
      return Err(GradeError::CriterionOutOfRange { criterion: c.as_str(), value });
    }
  }
  for d in &grade.deductions {
    if d.reason.trim().is_empty() {
      return Err(GradeError::EmptyDeductionReason);
    }
    if !d.amount.is_finite() || d.amount > 0.0 {
      return Err(GradeError::PositiveDeduction { reason: d.reason.clone(), amount: d.amount });
    }
  }
  Ok(())
}

impl Grader {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model =
      std::env::var("OPENAI_GRADER_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    Self::new(api_key, base_url, model).ok()
  }

  pub fn new(api_key: String, base_url: String, model: String) -> Result<Self, GradeError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| GradeError::Transport(e.to_string()))?;
    Ok(Self { client, api_key, base_url, model, retry_delay: RETRY_DELAY })
  }

  /// JSON-object chat completion; returns the raw message content.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json_raw(&self, system: &str, user: &str) -> Result<String, GradeError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature: 0.2,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
      max_tokens: Some(1000),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "prompt-trainer-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| GradeError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(GradeError::Status { status, message });
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| GradeError::Parse(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(target: "grader", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    Ok(body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default())
  }

  /// Ask the model for a four-criterion grade, retrying transport and shape failures.
  #[instrument(level = "info", skip(self, prompts, text), fields(%phase, text_len = text.len()))]
  pub async fn grade(&self, prompts: &Prompts, phase: Phase, text: &str) -> Result<ExternalGrade, GradeError> {
    let system = fill_template(&prompts.grader_system, &[("phase", phase.as_str())]);
    let user = fill_template(&prompts.grader_user_template, &[("phase", phase.as_str()), ("prompt", text)]);

    let mut attempt = 1;
    loop {
      let start = std::time::Instant::now();
      let result = match self.chat_json_raw(&system, &user).await {
        Ok(raw) => {
          info!(target: "grader", attempt, elapsed = ?start.elapsed(), response_len = raw.len(), "Grader response received");
          parse_grade(&raw)
        }
        Err(e) => Err(e),
      };

      match result {
        Ok(g) => return Ok(g),
        Err(e) if attempt < MAX_ATTEMPTS => {
          warn!(target: "grader", attempt, error = %e, "Grader attempt failed; retrying");
          attempt += 1;
          tokio::time::sleep(self.retry_delay).await;
        }
        Err(e) => {
          error!(target: "grader", attempt, error = %e, "Grader failed after all attempts");
          return Err(e);
        }
      }
    }
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const GOOD: &str = r#"{
    "criteriaScores": {"taskClarity": 21, "subjectSpecificity": 19, "completeness": 17, "context": 20},
    "deductions": [{"reason": "Slightly vague scope", "amount": -0.5}],
    "feedback": {"strengths": ["Clear verb"], "improvements": [], "suggestions": [], "examples": []}
  }"#;

  #[test]
  fn accepts_well_formed_grade() {
    let g = parse_grade(GOOD).unwrap();
    assert_eq!(g.criteria_scores.total(), 77.0);
    assert_eq!(g.feedback.strengths, vec!["Clear verb"]);
  }

  #[test]
  fn rejects_missing_feedback_list() {
    let raw = GOOD.replace(r#""examples": []"#, r#""extra": []"#);
    assert!(matches!(parse_grade(&raw), Err(GradeError::Parse(_))));
  }

  #[test]
  fn rejects_out_of_range_criterion() {
    let raw = GOOD.replace(r#""context": 20"#, r#""context": 26"#);
    match parse_grade(&raw) {
      Err(GradeError::CriterionOutOfRange { criterion, value }) => {
        assert_eq!(criterion, "context");
        assert_eq!(value, 26.0);
      }
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[test]
  fn rejects_positive_deduction() {
    let raw = GOOD.replace("-0.5", "0.5");
    assert!(matches!(parse_grade(&raw), Err(GradeError::PositiveDeduction { .. })));
  }

  #[test]
  fn rejects_blank_deduction_reason() {
    let raw = GOOD.replace("Slightly vague scope", "  ");
    assert!(matches!(parse_grade(&raw), Err(GradeError::EmptyDeductionReason)));
  }

  #[test]
  fn rejects_non_json() {
    assert!(matches!(parse_grade("Score: 8/10"), Err(GradeError::Parse(_))));
  }

  #[test]
  fn error_body_message_is_extracted() {
    let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Invalid API key"));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
