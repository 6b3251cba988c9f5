//! Domain models used by the backend: phases, criteria, deductions, feedback,
//! evaluation results and the grade source variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvaluateError;

/// Skill stage a learner works through. Order is fixed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  #[serde(alias = "detail")]
  Detailed,
  Concise,
  Creative,
}

impl Phase {
  pub const ORDER: [Phase; 3] = [Phase::Detailed, Phase::Concise, Phase::Creative];

  pub fn as_str(&self) -> &'static str {
    match self {
      Phase::Detailed => "detailed",
      Phase::Concise => "concise",
      Phase::Creative => "creative",
    }
  }

  /// Phase unlocked by completing this one (None for the last phase).
  pub fn next(&self) -> Option<Phase> {
    let idx = Self::ORDER.iter().position(|p| p == self)?;
    Self::ORDER.get(idx + 1).copied()
  }
}

impl Default for Phase {
  fn default() -> Self { Phase::Detailed }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Phase {
  type Err = EvaluateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "detailed" | "detail" => Ok(Phase::Detailed),
      "concise" => Ok(Phase::Concise),
      "creative" => Ok(Phase::Creative),
      other => Err(EvaluateError::UnknownPhase(other.to_string())),
    }
  }
}

/// One of the four quality dimensions, each scored 0..=25.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Criterion {
  TaskClarity,
  SubjectSpecificity,
  Completeness,
  Context,
}

impl Criterion {
  pub const ALL: [Criterion; 4] = [
    Criterion::TaskClarity,
    Criterion::SubjectSpecificity,
    Criterion::Completeness,
    Criterion::Context,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Criterion::TaskClarity => "taskClarity",
      Criterion::SubjectSpecificity => "subjectSpecificity",
      Criterion::Completeness => "completeness",
      Criterion::Context => "context",
    }
  }
}

pub const CRITERION_MAX: f64 = 25.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CriterionScores {
  pub task_clarity: f64,
  pub subject_specificity: f64,
  pub completeness: f64,
  pub context: f64,
}

impl CriterionScores {
  pub const fn new(task_clarity: f64, subject_specificity: f64, completeness: f64, context: f64) -> Self {
    Self { task_clarity, subject_specificity, completeness, context }
  }

  pub fn get(&self, c: Criterion) -> f64 {
    match c {
      Criterion::TaskClarity => self.task_clarity,
      Criterion::SubjectSpecificity => self.subject_specificity,
      Criterion::Completeness => self.completeness,
      Criterion::Context => self.context,
    }
  }

  pub fn total(&self) -> f64 {
    Criterion::ALL.iter().map(|c| self.get(*c)).sum()
  }
}

/// Named negative adjustment applied after the criteria are summed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Deduction {
  pub reason: String,
  pub amount: f64,
}

impl Deduction {
  pub fn new(reason: impl Into<String>, amount: f64) -> Self {
    Self { reason: reason.into(), amount }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Feedback {
  #[serde(default)] pub strengths: Vec<String>,
  #[serde(default)] pub improvements: Vec<String>,
  #[serde(default)] pub suggestions: Vec<String>,
  #[serde(default)] pub examples: Vec<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityTier {
  Low,
  Mid,
  High,
}

/// Externally supplied grade. Only trusted after `grader::check_grade`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalGrade {
  pub criteria_scores: CriterionScores,
  #[serde(default)]
  pub deductions: Vec<Deduction>,
  #[serde(default)]
  pub feedback: Feedback,
}

/// Band markers a learner (or a test) can embed to pick a fixture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixtureHint {
  ExactNine,
  ExactSix,
  AlmostSix,
  High,
  Low,
  Default,
}

impl FixtureHint {
  pub fn from_text(text: &str) -> Self {
    if text.contains("test-score-9.0") {
      FixtureHint::ExactNine
    } else if text.contains("test-score-6.0") {
      FixtureHint::ExactSix
    } else if text.contains("test-score-5.9") {
      FixtureHint::AlmostSix
    } else if text.contains("test-high-score") {
      FixtureHint::High
    } else if text.contains("test-low-score") {
      FixtureHint::Low
    } else {
      FixtureHint::Default
    }
  }
}

/// Where the baseline criteria/deductions/feedback come from.
#[derive(Clone, Debug, PartialEq)]
pub enum GradeSource {
  External(ExternalGrade),
  Fixture { phase: Phase, hint: FixtureHint },
}

impl GradeSource {
  pub fn kind(&self) -> GradeSourceKind {
    match self {
      GradeSource::External(_) => GradeSourceKind::External,
      GradeSource::Fixture { .. } => GradeSourceKind::Fixture,
    }
  }

  /// Resolve to the concrete baseline used by scoring and feedback.
  pub fn baseline(&self) -> ExternalGrade {
    match self {
      GradeSource::External(g) => g.clone(),
      GradeSource::Fixture { phase, hint } => crate::seeds::fixture_grade(*phase, *hint),
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradeSourceKind {
  External,
  Fixture,
}

/// Accepted submission. Built only through `Submission::new`, which enforces
/// the input checks.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
  text: String,
  phase: Phase,
}

impl Submission {
  pub fn new(text: &str, phase: &str) -> Result<Self, EvaluateError> {
    if text.is_empty() || phase.trim().is_empty() {
      return Err(EvaluateError::MissingFields);
    }
    let phase = phase.parse::<Phase>()?;
    if text.trim().is_empty() {
      return Err(EvaluateError::EmptyText);
    }
    Ok(Self { text: text.to_string(), phase })
  }

  pub fn text(&self) -> &str { &self.text }
  pub fn phase(&self) -> Phase { self.phase }
}

/// Engine output for one submission. Never mutated after construction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
  pub score: f64,
  pub quality_percentage: f64,
  pub quality_tier: QualityTier,
  pub criteria_scores: CriterionScores,
  pub deductions: Vec<Deduction>,
  pub feedback: Feedback,
  pub phase: Phase,
  pub grade_source: GradeSourceKind,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phase_parsing_accepts_legacy_alias() {
    assert_eq!("detail".parse::<Phase>().unwrap(), Phase::Detailed);
    assert_eq!(" Concise ".parse::<Phase>().unwrap(), Phase::Concise);
    assert!(matches!("poetic".parse::<Phase>(), Err(EvaluateError::UnknownPhase(p)) if p == "poetic"));
  }

  #[test]
  fn phase_chain_is_linear() {
    assert_eq!(Phase::Detailed.next(), Some(Phase::Concise));
    assert_eq!(Phase::Concise.next(), Some(Phase::Creative));
    assert_eq!(Phase::Creative.next(), None);
  }

  #[test]
  fn submission_rejects_blank_text_and_bad_phase() {
    assert!(matches!(Submission::new("   ", "concise"), Err(EvaluateError::EmptyText)));
    assert!(matches!(Submission::new("", "concise"), Err(EvaluateError::MissingFields)));
    assert!(matches!(Submission::new("Write it.", "x"), Err(EvaluateError::UnknownPhase(_))));
    let s = Submission::new("Write it.", "creative").unwrap();
    assert_eq!(s.phase(), Phase::Creative);
  }

  #[test]
  fn hint_tags_pick_bands() {
    assert_eq!(FixtureHint::from_text("x test-score-9.0"), FixtureHint::ExactNine);
    assert_eq!(FixtureHint::from_text("test-low-score"), FixtureHint::Low);
    assert_eq!(FixtureHint::from_text("plain"), FixtureHint::Default);
  }

  #[test]
  fn external_grade_reads_camel_case() {
    let g: ExternalGrade = serde_json::from_str(
      r#"{"criteriaScores":{"taskClarity":20,"subjectSpecificity":19,"completeness":18,"context":17},
          "deductions":[{"reason":"Vague","amount":-0.5}],
          "feedback":{"strengths":["ok"],"improvements":[],"suggestions":[],"examples":[]}}"#,
    ).unwrap();
    assert_eq!(g.criteria_scores.total(), 74.0);
    assert_eq!(g.deductions.len(), 1);
  }
}
