//! Phase rubric tables: band sentences per criterion, improvement and
//! suggestion sentences, and the before/after example library.
//!
//! Built once at startup (defaults below, optionally replaced per phase from
//! TOML) and shared read-only with the feedback synthesizer.

use serde::Deserialize;

use crate::domain::{Criterion, Phase};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
  High,
  Mid,
  Low,
}

impl Level {
  /// ≥20 high, ≥15 mid, else low.
  pub fn for_score(score: f64) -> Self {
    if score >= 20.0 {
      Level::High
    } else if score >= 15.0 {
      Level::Mid
    } else {
      Level::Low
    }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Banded {
  pub high: String,
  pub mid: String,
  pub low: String,
}

impl Banded {
  fn new(high: &str, mid: &str, low: &str) -> Self {
    Self { high: high.into(), mid: mid.into(), low: low.into() }
  }

  pub fn at(&self, level: Level) -> &str {
    match level {
      Level::High => &self.high,
      Level::Mid => &self.mid,
      Level::Low => &self.low,
    }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Improvements {
  pub audience: String,
  pub constraints: String,
  pub ambiguity: String,
  /// Concise phase: advisory length nudge.
  #[serde(default)]
  pub word_count: Option<String>,
  /// Creative phase: explicit creativity nudge.
  #[serde(default)]
  pub innovation: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Suggestions {
  pub audience: String,
  pub constraints: String,
  #[serde(default)]
  pub precision: Option<String>,
  #[serde(default)]
  pub creativity: Option<String>,
  #[serde(default)]
  pub innovation: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PhaseRubric {
  pub task_clarity: Banded,
  pub subject_specificity: Banded,
  pub completeness: Banded,
  pub context: Banded,
  pub improvements: Improvements,
  pub suggestions: Suggestions,
  /// Model rewrites shown as the "After" half of an example pair.
  pub examples: Banded,
}

impl PhaseRubric {
  pub fn criterion(&self, c: Criterion) -> &Banded {
    match c {
      Criterion::TaskClarity => &self.task_clarity,
      Criterion::SubjectSpecificity => &self.subject_specificity,
      Criterion::Completeness => &self.completeness,
      Criterion::Context => &self.context,
    }
  }
}

/// Generic sentence used when a criterion scores below the mid band.
pub fn generic_improvement(c: Criterion) -> &'static str {
  match c {
    Criterion::TaskClarity => "Improve task clarity with a specific action verb",
    Criterion::SubjectSpecificity => "Define the subject matter more clearly",
    Criterion::Completeness => "Include more comprehensive requirements",
    Criterion::Context => "Provide more contextual information",
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Rubrics {
  #[serde(default = "detailed_rubric")]
  pub detailed: PhaseRubric,
  #[serde(default = "concise_rubric")]
  pub concise: PhaseRubric,
  #[serde(default = "creative_rubric")]
  pub creative: PhaseRubric,
}

impl Default for Rubrics {
  fn default() -> Self {
    Self { detailed: detailed_rubric(), concise: concise_rubric(), creative: creative_rubric() }
  }
}

impl Rubrics {
  pub fn for_phase(&self, phase: Phase) -> &PhaseRubric {
    match phase {
      Phase::Detailed => &self.detailed,
      Phase::Concise => &self.concise,
      Phase::Creative => &self.creative,
    }
  }
}

const AMBIGUITY_IMPROVEMENT: &str = "Replace ambiguous terms like 'some' or 'various' with specific numbers";

fn detailed_rubric() -> PhaseRubric {
  PhaseRubric {
    task_clarity: Banded::new(
      "Excellent task clarity with specific action required",
      "Clear action-oriented task",
      "Basic task definition present",
    ),
    subject_specificity: Banded::new(
      "Well-defined subject matter with clear scope",
      "Good subject focus",
      "Subject matter needs more definition",
    ),
    completeness: Banded::new(
      "Comprehensive requirements specified",
      "Adequate requirements included",
      "Minimal requirements specified",
    ),
    context: Banded::new(
      "Excellent contextual information provided",
      "Sufficient context included",
      "Limited context provided",
    ),
    improvements: Improvements {
      audience: "Specify the target audience more clearly".into(),
      constraints: "Add more explicit constraints (using 'must' or 'should')".into(),
      ambiguity: AMBIGUITY_IMPROVEMENT.into(),
      word_count: None,
      innovation: None,
    },
    suggestions: Suggestions {
      audience: "Add specific mention of who the content is for (e.g., 'for first-year college students')".into(),
      constraints: "Include specific requirements like 'must include at least 5 techniques'".into(),
      precision: None,
      creativity: None,
      innovation: None,
    },
    examples: Banded::new(
      "Write a comprehensive guide for first-year medical students that must include at least 5 evidence-based study techniques, 3 time management strategies, and visual diagrams for complex concepts.",
      "Write a detailed study guide for college students that must include effective study habits and time management techniques.",
      "Write a guide about studying.",
    ),
  }
}

fn concise_rubric() -> PhaseRubric {
  PhaseRubric {
    task_clarity: Banded::new(
      "Excellent concise task definition",
      "Clear action verb in concise format",
      "Basic task present but could be clearer",
    ),
    subject_specificity: Banded::new(
      "Precise subject focus despite brevity",
      "Subject is defined within word limit",
      "Subject needs more specificity while maintaining brevity",
    ),
    completeness: Banded::new(
      "Complete request in a single sentence",
      "Adequate information in concise format",
      "Missing key elements while staying concise",
    ),
    context: Banded::new(
      "Excellent context despite word constraints",
      "Sufficient context for brevity",
      "Minimal context provided",
    ),
    improvements: Improvements {
      audience: "Name the audience briefly (e.g., 'for nurses')".into(),
      constraints: "State the most important constraints briefly".into(),
      ambiguity: AMBIGUITY_IMPROVEMENT.into(),
      word_count: Some("Ensure the prompt stays under 18 words".into()),
      innovation: None,
    },
    suggestions: Suggestions {
      audience: "Include audience briefly (e.g., 'for students')".into(),
      constraints: "Focus on a single, clear deliverable".into(),
      precision: Some("Replace general terms with specific ones".into()),
      creativity: None,
      innovation: None,
    },
    examples: Banded::new(
      "Create a focused study guide covering essential memory techniques for medical students.",
      "Write a concise guide for effective studying.",
      "Make a study guide.",
    ),
  }
}

fn creative_rubric() -> PhaseRubric {
  PhaseRubric {
    task_clarity: Banded::new(
      "Excellent creative task definition",
      "Clear creative direction provided",
      "Basic creative elements present",
    ),
    subject_specificity: Banded::new(
      "Well-defined creative subject matter",
      "Creative subject is adequately specified",
      "Creative subject needs more definition",
    ),
    completeness: Banded::new(
      "Comprehensive creative requirements",
      "Adequate creative elements included",
      "Minimal creative specifications",
    ),
    context: Banded::new(
      "Excellent context for creative work",
      "Sufficient creative context provided",
      "Limited creative context",
    ),
    improvements: Improvements {
      audience: "Specify the intended audience for the creative piece".into(),
      constraints: "Add a few constraints to give the creativity direction".into(),
      ambiguity: AMBIGUITY_IMPROVEMENT.into(),
      word_count: None,
      innovation: Some("Include more specific innovative elements".into()),
    },
    suggestions: Suggestions {
      audience: "Frame the piece for a specific audience (e.g., 'for curious teenagers')".into(),
      constraints: "Add requirements for unique or original elements".into(),
      precision: None,
      creativity: Some("Use more explicit creative terms (e.g., 'reimagine', 'transform')".into()),
      innovation: Some("Specify what makes this truly innovative".into()),
    },
    examples: Banded::new(
      "Create an innovative learning framework that reimagines traditional study methods through interactive storytelling and personalized memory techniques.",
      "Design a creative study approach using new learning techniques.",
      "Make a different kind of study guide.",
    ),
  }
}
