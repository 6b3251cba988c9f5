//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::Phase;
use crate::error::{ApiError, EvaluateError};
use crate::logic::*;
use crate::progress::ProgressState;
use crate::protocol::*;
use crate::seeds::{phase_catalog, phase_info, PhaseInfo};
use crate::state::{AppState, StoredEvaluation};

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, external_grader: state.grader.is_some() })
}

#[instrument(level = "info")]
pub async fn http_list_phases() -> Json<Vec<PhaseInfo>> {
  Json(phase_catalog())
}

#[instrument(level = "info")]
pub async fn http_get_phase(Path(name): Path<String>) -> Result<Json<PhaseInfo>, EvaluateError> {
  let phase = name.parse::<Phase>()?;
  Ok(Json(phase_info(phase)))
}

#[instrument(level = "info", skip(state, body), fields(phase = ?body.phase, prompt_len = body.prompt.as_deref().map_or(0, str::len)))]
pub async fn http_post_evaluate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<EvaluateIn>,
) -> Result<Json<EvaluationOutcome>, EvaluateError> {
  let user_id = user_or_local(body.user_id.as_deref());
  let outcome = evaluate_prompt(
    &state,
    user_id,
    body.prompt.as_deref().unwrap_or_default(),
    body.phase.as_deref().unwrap_or_default(),
  )
  .await?;
  info!(target: "evaluation", %user_id, id = %outcome.evaluation.id, score = outcome.evaluation.evaluation.score, "HTTP evaluate served");
  Ok(Json(outcome))
}

#[instrument(level = "info", skip(state), fields(user_id = ?q.user_id, phase = ?q.phase))]
pub async fn http_list_evaluations(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<StoredEvaluation>>, ApiError> {
  let user_id = user_or_local(q.user_id.as_deref());
  let list = evaluation_history(&state, user_id, q.phase.as_deref()).await?;
  Ok(Json(list))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_evaluation(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<UserQuery>,
) -> Result<Json<StoredEvaluation>, ApiError> {
  let user_id = user_or_local(q.user_id.as_deref());
  let entry = state.history_entry(user_id, &id).await?;
  Ok(Json(entry))
}

#[instrument(level = "info", skip(state), fields(user_id = ?q.user_id))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> Json<ProgressState> {
  Json(state.progress_for(user_or_local(q.user_id.as_deref())).await)
}

#[instrument(level = "info", skip(state, body), fields(phase = %body.phase))]
pub async fn http_post_select_phase(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SelectPhaseIn>,
) -> Result<Json<ProgressState>, ApiError> {
  let user_id = user_or_local(body.user_id.as_deref());
  let progress = change_phase(&state, user_id, &body.phase).await?;
  Ok(Json(progress))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_onboarding(
  State(state): State<Arc<AppState>>,
  Json(body): Json<OnboardingIn>,
) -> Json<ProgressState> {
  let user_id = user_or_local(body.user_id.as_deref());
  let progress = state.complete_onboarding(user_id).await;
  info!(target: "progress", %user_id, "Onboarding completed");
  Json(progress)
}
