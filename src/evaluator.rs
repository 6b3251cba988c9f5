//! The deterministic evaluation pipeline:
//! validate → resolve grade source → score → synthesize feedback.
//!
//! Pure and synchronous. Identical inputs always produce identical results.

use tracing::{info, instrument};

use crate::domain::{EvaluationResult, GradeSource, Submission};
use crate::error::EvaluateError;
use crate::feedback::synthesize;
use crate::rubric::Rubrics;
use crate::scoring::score;
use crate::validator::validate;

#[instrument(level = "debug", skip_all, fields(phase = %submission.phase(), source = ?source.kind()))]
pub fn evaluate(submission: &Submission, source: &GradeSource, rubrics: &Rubrics) -> Result<EvaluationResult, EvaluateError> {
  let text = submission.text();
  let phase = submission.phase();

  let errors = validate(text, phase);
  if !errors.is_empty() {
    return Err(EvaluateError::Validation(errors));
  }

  let baseline = source.baseline();
  let card = score(&baseline.criteria_scores, &baseline.deductions, text, phase);
  let feedback = synthesize(
    rubrics,
    &baseline.criteria_scores,
    &card.deductions,
    card.score,
    phase,
    text,
    &baseline.feedback,
  );

  info!(
    target: "evaluation",
    %phase,
    score = card.score,
    quality_percentage = card.quality_percentage,
    tier = ?card.quality_tier,
    deductions = card.deductions.len(),
    "Prompt evaluated"
  );

  Ok(EvaluationResult {
    score: card.score,
    quality_percentage: card.quality_percentage,
    quality_tier: card.quality_tier,
    criteria_scores: baseline.criteria_scores,
    deductions: card.deductions,
    feedback,
    phase,
    grade_source: source.kind(),
  })
}
