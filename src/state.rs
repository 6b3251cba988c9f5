//! Application state: per-user progress and history stores, rubric tables,
//! grader prompts, and the optional external grader client.
//!
//! This module owns:
//!   - progress by user (one `ProgressState` each)
//!   - evaluation history by user (newest last, capped)
//!   - the rubric tables and prompts (from TOML or defaults)
//!   - optional grader client
//!
//! Every read-modify-write of a user's progress happens under a single write
//! guard, so concurrent submissions for the same user serialize.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_agent_config_from_env, Prompts};
use crate::domain::{EvaluationResult, FixtureHint, GradeSource, Phase, Submission};
use crate::error::ProgressError;
use crate::grader::Grader;
use crate::progress::{ProgressState, ProgressUpdate};
use crate::rubric::Rubrics;

/// Oldest records are dropped beyond this many per user.
pub const MAX_HISTORY_PER_USER: usize = 200;

/// Immutable history record of one accepted evaluation.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvaluation {
    pub id: Uuid,
    pub user_id: String,
    pub prompt: String,
    #[serde(flatten)]
    pub evaluation: EvaluationResult,
}

#[derive(Clone)]
pub struct AppState {
    pub progress: Arc<RwLock<HashMap<String, ProgressState>>>,
    pub history: Arc<RwLock<HashMap<String, VecDeque<StoredEvaluation>>>>,
    pub rubrics: Arc<Rubrics>,
    pub prompts: Prompts,
    pub grader: Option<Grader>,
}

impl AppState {
    /// Build state from env: load config, rubric tables, init grader.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();

        let grader = Grader::from_env();
        if let Some(g) = &grader {
            info!(target: "prompt_trainer", base_url = %g.base_url, model = %g.model, "External grader enabled.");
        } else {
            info!(target: "prompt_trainer", "External grader disabled (no OPENAI_API_KEY). Using fixture grades.");
        }

        Self::with_parts(cfg.rubrics, cfg.prompts, grader)
    }

    pub fn with_parts(rubrics: Rubrics, prompts: Prompts, grader: Option<Grader>) -> Self {
        Self {
            progress: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(HashMap::new())),
            rubrics: Arc::new(rubrics),
            prompts,
            grader,
        }
    }

    /// External grade when the grader is configured and returns something
    /// trustworthy; the phase fixture otherwise.
    #[instrument(level = "info", skip(self, submission), fields(phase = %submission.phase()))]
    pub async fn grade_source(&self, submission: &Submission) -> GradeSource {
        let fixture = GradeSource::Fixture {
            phase: submission.phase(),
            hint: FixtureHint::from_text(submission.text()),
        };
        let Some(grader) = &self.grader else {
            return fixture;
        };
        match grader.grade(&self.prompts, submission.phase(), submission.text()).await {
            Ok(grade) => GradeSource::External(grade),
            Err(e) => {
                warn!(target: "grader", error = %e, "External grade rejected; using fixture set");
                fixture
            }
        }
    }

    /// Snapshot of a user's progress (fresh state for unknown users).
    #[instrument(level = "debug", skip(self))]
    pub async fn progress_for(&self, user_id: &str) -> ProgressState {
        self.progress.read().await.get(user_id).cloned().unwrap_or_default()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn record_progress(&self, user_id: &str, phase: Phase, score: f64) -> ProgressUpdate {
        let mut all = self.progress.write().await;
        all.entry(user_id.to_string()).or_default().record_evaluation(phase, score)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn select_phase(&self, user_id: &str, phase: Phase) -> Result<ProgressState, ProgressError> {
        let mut all = self.progress.write().await;
        let state = all.entry(user_id.to_string()).or_default();
        state.select_phase(phase)?;
        Ok(state.clone())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn complete_onboarding(&self, user_id: &str) -> ProgressState {
        let mut all = self.progress.write().await;
        let state = all.entry(user_id.to_string()).or_default();
        state.complete_onboarding();
        state.clone()
    }

    /// Append an immutable history record and return it with its new id.
    #[instrument(level = "debug", skip(self, prompt, evaluation), fields(phase = %evaluation.phase))]
    pub async fn push_history(&self, user_id: &str, prompt: &str, evaluation: EvaluationResult) -> StoredEvaluation {
        let record = StoredEvaluation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
            evaluation,
        };
        let mut all = self.history.write().await;
        let list = all.entry(user_id.to_string()).or_default();
        list.push_back(record.clone());
        while list.len() > MAX_HISTORY_PER_USER {
            list.pop_front();
        }
        record
    }

    /// Newest first, optionally filtered by phase.
    #[instrument(level = "debug", skip(self))]
    pub async fn history_for(&self, user_id: &str, phase: Option<Phase>) -> Vec<StoredEvaluation> {
        let all = self.history.read().await;
        all.get(user_id)
            .map(|list| {
                list.iter()
                    .rev()
                    .filter(|r| phase.map_or(true, |p| r.evaluation.phase == p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn history_entry(&self, user_id: &str, id: &str) -> Result<StoredEvaluation, ProgressError> {
        let all = self.history.read().await;
        all.get(user_id)
            .and_then(|list| list.iter().find(|r| r.id.to_string() == id).cloned())
            .ok_or_else(|| ProgressError::EvaluationNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::{extract::State, http::StatusCode, routing::post, Router};
    use serde_json::json;

    use crate::domain::GradeSourceKind;
    use crate::evaluator::evaluate;

    fn state() -> AppState {
        AppState::with_parts(Rubrics::default(), Prompts::default(), None)
    }

    #[tokio::test]
    async fn without_grader_the_fixture_is_used() {
        let s = state();
        let sub = Submission::new("Write a poem test-high-score.", "concise").unwrap();
        assert_eq!(
            s.grade_source(&sub).await,
            GradeSource::Fixture { phase: Phase::Concise, hint: FixtureHint::High }
        );
    }

    #[tokio::test]
    async fn history_is_per_user_newest_first_and_filterable() {
        let s = state();
        let a = Submission::new("Write a haiku about rain.", "concise").unwrap();
        let r = evaluate(&a, &s.grade_source(&a).await, &s.rubrics).unwrap();
        let first = s.push_history("u1", a.text(), r.clone()).await;
        let second = s.push_history("u1", a.text(), r).await;

        let list = s.history_for("u1", None).await;
        assert_eq!(list.iter().map(|e| e.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert!(s.history_for("u1", Some(Phase::Creative)).await.is_empty());
        assert!(s.history_for("u2", None).await.is_empty());

        assert_eq!(s.history_entry("u1", &first.id.to_string()).await.unwrap(), first);
        assert!(s.history_entry("u2", &first.id.to_string()).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_updates_for_one_user_serialize() {
        let s = state();
        let mut handles = Vec::new();
        for i in 0..50u32 {
            let s = s.clone();
            handles.push(tokio::spawn(async move {
                s.record_progress("racer", Phase::Detailed, f64::from(i % 10)).await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let p = s.progress_for("racer").await;
        assert_eq!(p.phase(Phase::Detailed).attempts, 50);
        assert_eq!(p.phase(Phase::Detailed).best_score, 9.0);
        assert!(p.phase(Phase::Detailed).completed);
        assert!(!p.phase(Phase::Concise).locked);
    }

    /// Local chat-completions endpoint: first an HTTP 500, then grades with an
    /// out-of-range criterion.
    async fn broken_grader(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, String) {
        let n = hits.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            let body = json!({ "error": { "message": "upstream overloaded" } });
            return (StatusCode::INTERNAL_SERVER_ERROR, body.to_string());
        }
        let grade = json!({
            "criteriaScores": { "taskClarity": 40, "subjectSpecificity": 20, "completeness": 20, "context": 20 },
            "deductions": [],
            "feedback": { "strengths": [], "improvements": [], "suggestions": [], "examples": [] }
        });
        let body = json!({ "choices": [{ "message": { "content": grade.to_string() } }] });
        (StatusCode::OK, body.to_string())
    }

    async fn state_with_broken_grader() -> (AppState, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/chat/completions", post(broken_grader))
            .with_state(hits.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut grader = Grader::new("test-key".into(), format!("http://{addr}"), "test-model".into()).unwrap();
        grader.retry_delay = Duration::from_millis(10);
        (AppState::with_parts(Rubrics::default(), Prompts::default(), Some(grader)), hits)
    }

    #[tokio::test]
    async fn failing_grader_is_retried_then_replaced_by_fixture() {
        let (s, hits) = state_with_broken_grader().await;
        let sub = Submission::new("Write a poem for kids test-high-score.", "concise").unwrap();

        let source = s.grade_source(&sub).await;
        assert_eq!(source, GradeSource::Fixture { phase: Phase::Concise, hint: FixtureHint::High });
        assert_eq!(hits.load(Ordering::SeqCst), 3, "one status failure, two rejected grades");
    }

    #[tokio::test]
    async fn evaluation_scores_from_fixture_when_grader_fails() {
        let (s, _) = state_with_broken_grader().await;
        let text = "Write a revision guide for second-year chemistry students that must include ten worked problems and a clear summary table test-high-score";
        let out = crate::logic::evaluate_prompt(&s, "u", text, "detailed").await.unwrap();
        assert_eq!(out.evaluation.evaluation.grade_source, GradeSourceKind::Fixture);
        assert_eq!(out.evaluation.evaluation.score, 9.0);
        assert_eq!(out.progress.attempts, 1);
    }
}
