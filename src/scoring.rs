//! Deterministic scoring: criteria sum, rule-derived deductions, 0–10 score and tier.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::{CriterionScores, Deduction, Phase, QualityTier};

pub const HIGH_TIER_MIN: f64 = 9.0;
pub const MID_TIER_MIN: f64 = 6.0;

pub const MISSING_AUDIENCE_REASON: &str = "Missing audience specification";
pub const AMBIGUOUS_REASON: &str = "Ambiguous quantifiers (use specific numbers instead of \"some\" or \"various\")";

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
  pub score: f64,
  pub quality_percentage: f64,
  pub quality_tier: QualityTier,
  pub deductions: Vec<Deduction>,
}

impl ScoreCard {
  pub fn deductions_sum(&self) -> f64 {
    self.deductions.iter().map(|d| d.amount).sum()
  }
}

pub fn tier_for(score: f64) -> QualityTier {
  if score >= HIGH_TIER_MIN {
    QualityTier::High
  } else if score >= MID_TIER_MIN {
    QualityTier::Mid
  } else {
    QualityTier::Low
  }
}

/// Penalties read straight off the text. Independent of validation.
pub fn rule_deductions(text: &str, phase: Phase) -> Vec<Deduction> {
  let lower = text.to_lowercase();
  let mut out = Vec::new();
  if phase != Phase::Concise && !lower.contains("for") {
    out.push(Deduction::new(MISSING_AUDIENCE_REASON, -0.5));
  }
  if lower.contains("some") || lower.contains("various") {
    out.push(Deduction::new(AMBIGUOUS_REASON, -1.0));
  }
  out
}

#[instrument(level = "debug", skip(criteria, base_deductions, text), fields(%phase))]
pub fn score(criteria: &CriterionScores, base_deductions: &[Deduction], text: &str, phase: Phase) -> ScoreCard {
  let quality_percentage = criteria.total();

  let mut deductions = base_deductions.to_vec();
  deductions.extend(rule_deductions(text, phase));
  let deductions_sum: f64 = deductions.iter().map(|d| d.amount).sum();

  // Rounding the 0..=100 point total is the same as rounding the 0..=10
  // score to one decimal, without the float drift of the divide-then-scale path.
  let points = (quality_percentage + deductions_sum).clamp(0.0, 100.0);
  let score = points.round() / 10.0;
  let quality_tier = tier_for(score);

  debug!(target: "evaluation", quality_percentage, deductions_sum, score, ?quality_tier, "Scored prompt");
  ScoreCard { score, quality_percentage, quality_tier, deductions }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn score_follows_formula_and_thresholds() {
    let c = CriterionScores::new(23.0, 22.0, 22.0, 23.0);
    let card = score(&c, &[Deduction::new("Could include more specific constraints", -0.5)], "Write it for me", Phase::Detailed);
    assert_eq!(card.quality_percentage, 90.0);
    assert_eq!(card.score, 9.0, "8.95 rounds up");
    assert_eq!(card.quality_tier, QualityTier::High);

    let c = CriterionScores::new(15.0, 15.0, 15.0, 15.0);
    let card = score(&c, &[], "Write it for me", Phase::Detailed);
    assert_eq!(card.score, 6.0);
    assert_eq!(card.quality_tier, QualityTier::Mid);

    let c = CriterionScores::new(15.0, 15.0, 14.0, 15.0);
    let card = score(&c, &[Deduction::new("Missing specific requirements", -0.5)], "Write it for me", Phase::Detailed);
    assert_eq!(card.score, 5.9);
    assert_eq!(card.quality_tier, QualityTier::Low);
  }

  #[test]
  fn score_is_clamped() {
    let c = CriterionScores::new(0.0, 0.0, 0.0, 1.0);
    let card = score(&c, &[Deduction::new("x", -5.0)], "Write some text", Phase::Creative);
    assert_eq!(card.score, 0.0);
    assert_eq!(card.quality_tier, QualityTier::Low);
    assert_eq!(card.deductions_sum(), -6.5);

    let c = CriterionScores::new(25.0, 25.0, 25.0, 25.0);
    assert_eq!(score(&c, &[], "Write for you", Phase::Detailed).score, 10.0);
  }

  #[test]
  fn ambiguity_applies_once_in_every_phase() {
    for phase in Phase::ORDER {
      let ds = rule_deductions("Write about VARIOUS and some topics for kids", phase);
      let ambiguous: Vec<_> = ds.iter().filter(|d| d.reason.contains("Ambiguous quantifiers")).collect();
      assert_eq!(ambiguous.len(), 1, "{phase}");
      assert_eq!(ambiguous[0].amount, -1.0);
    }
  }

  #[test]
  fn concise_is_exempt_from_audience_deduction() {
    assert!(rule_deductions("Write a poem.", Phase::Concise).is_empty());
    let ds = rule_deductions("Write a poem.", Phase::Creative);
    assert_eq!(ds, vec![Deduction::new(MISSING_AUDIENCE_REASON, -0.5)]);
  }

  #[test]
  fn base_deductions_come_first() {
    let c = CriterionScores::new(18.0, 16.0, 15.0, 16.0);
    let card = score(&c, &[Deduction::new("base", -1.0)], "Write various things.", Phase::Concise);
    assert_eq!(card.deductions[0].reason, "base");
    assert_eq!(card.deductions[1].reason, AMBIGUOUS_REASON);
    assert_eq!(card.score, 6.3);
  }
}
