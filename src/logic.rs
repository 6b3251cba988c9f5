//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Evaluating a submission end to end (grade source, engine, progress, history)
//!   - Phase selection and history lookups that take raw phase names

use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::{Phase, Submission};
use crate::error::{ApiError, EvaluateError};
use crate::evaluator::evaluate;
use crate::progress::{ProgressState, ProgressUpdate};
use crate::state::{AppState, StoredEvaluation};
use crate::util::trunc_for_log;

/// Anonymous learner used when the request carries no user id.
pub const LOCAL_USER: &str = "local";

pub fn user_or_local(user_id: Option<&str>) -> &str {
  match user_id.map(str::trim) {
    Some(u) if !u.is_empty() => u,
    _ => LOCAL_USER,
  }
}

/// Everything the caller needs after one accepted evaluation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
  pub evaluation: StoredEvaluation,
  pub progress: ProgressUpdate,
  /// Set once, on the evaluation that unlocked it.
  pub phase_unlocked: Option<Phase>,
}

#[instrument(level = "info", skip(state, prompt), fields(%user_id, %phase, prompt_len = prompt.len()))]
pub async fn evaluate_prompt(
  state: &AppState,
  user_id: &str,
  prompt: &str,
  phase: &str,
) -> Result<EvaluationOutcome, EvaluateError> {
  let submission = Submission::new(prompt, phase)?;

  // Validation runs ahead of the grader call; `evaluate` re-checks for direct callers.
  let errors = crate::validator::validate(submission.text(), submission.phase());
  if !errors.is_empty() {
    info!(target: "evaluation", %user_id, error_count = errors.len(), preview = %trunc_for_log(prompt, 60), "Submission rejected");
    return Err(EvaluateError::Validation(errors));
  }

  let source = state.grade_source(&submission).await;
  let result = evaluate(&submission, &source, &state.rubrics)?;

  let progress = state.record_progress(user_id, result.phase, result.score).await;
  if let Some(next) = progress.phase_unlocked {
    info!(target: "progress", %user_id, phase = %result.phase, unlocked = %next, "Phase unlocked");
  }

  let evaluation = state.push_history(user_id, submission.text(), result).await;
  let phase_unlocked = progress.phase_unlocked;

  Ok(EvaluationOutcome { evaluation, progress, phase_unlocked })
}

#[instrument(level = "info", skip(state), fields(%user_id, %phase))]
pub async fn change_phase(state: &AppState, user_id: &str, phase: &str) -> Result<ProgressState, ApiError> {
  let phase = phase.parse::<Phase>()?;
  let progress = state.select_phase(user_id, phase).await?;
  info!(target: "progress", %user_id, %phase, "Current phase changed");
  Ok(progress)
}

#[instrument(level = "debug", skip(state), fields(%user_id))]
pub async fn evaluation_history(state: &AppState, user_id: &str, phase: Option<&str>) -> Result<Vec<StoredEvaluation>, ApiError> {
  let phase = phase.map(str::parse::<Phase>).transpose()?;
  Ok(state.history_for(user_id, phase).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::rubric::Rubrics;

  fn state() -> AppState {
    AppState::with_parts(Rubrics::default(), Prompts::default(), None)
  }

  const DETAILED_HIGH: &str = "Write a revision guide for second-year chemistry students that must include ten worked problems and a clear summary table test-high-score";

  #[test]
  fn blank_user_maps_to_local() {
    assert_eq!(user_or_local(None), LOCAL_USER);
    assert_eq!(user_or_local(Some("  ")), LOCAL_USER);
    assert_eq!(user_or_local(Some("ana")), "ana");
  }

  #[tokio::test]
  async fn rejected_prompt_leaves_no_trace() {
    let s = state();
    let err = evaluate_prompt(&s, "u", "Write a guide about studying.", "detail").await.unwrap_err();
    assert!(matches!(err, EvaluateError::Validation(ref e) if e.len() == 3));
    assert!(s.history_for("u", None).await.is_empty());
    assert_eq!(s.progress_for("u").await.phase(Phase::Detailed).attempts, 0);
  }

  #[tokio::test]
  async fn high_score_unlocks_next_phase_once() {
    let s = state();
    let first = evaluate_prompt(&s, "u", DETAILED_HIGH, "detailed").await.unwrap();
    assert_eq!(first.evaluation.evaluation.score, 9.0);
    assert_eq!(first.phase_unlocked, Some(Phase::Concise));

    let second = evaluate_prompt(&s, "u", DETAILED_HIGH, "detailed").await.unwrap();
    assert_eq!(second.phase_unlocked, None);
    assert_eq!(second.progress.attempts, 2);
    assert_eq!(first.evaluation.evaluation, second.evaluation.evaluation);
    assert_ne!(first.evaluation.id, second.evaluation.id);
  }

  #[tokio::test]
  async fn locked_phase_evaluations_are_counted() {
    let s = state();
    let text = "Write a focused checklist for new nurses test-high-score.";
    for n in 1..=3u32 {
      let out = evaluate_prompt(&s, "u", text, "concise").await.unwrap();
      assert_eq!(out.progress.attempts, n);
      assert_eq!(out.progress.best_score, out.evaluation.evaluation.score);
    }
    let p = s.progress_for("u").await;
    assert_eq!(p.phase(Phase::Concise).attempts, 3);
    assert!(p.phase(Phase::Concise).completed);
    assert_eq!(s.history_for("u", Some(Phase::Concise)).await.len(), 3);
  }

  #[tokio::test]
  async fn phase_change_respects_locks_and_names() {
    let s = state();
    assert!(matches!(change_phase(&s, "u", "concise").await, Err(ApiError::Progress(_))));
    assert!(matches!(change_phase(&s, "u", "lyrical").await, Err(ApiError::Evaluate(EvaluateError::UnknownPhase(_)))));
    evaluate_prompt(&s, "u", DETAILED_HIGH, "detailed").await.unwrap();
    let p = change_phase(&s, "u", "Concise").await.unwrap();
    assert_eq!(p.current_phase, Phase::Concise);
    assert_eq!(evaluation_history(&s, "u", Some("detail")).await.unwrap().len(), 1);
    assert!(evaluation_history(&s, "u", Some("nope")).await.is_err());
  }
}
