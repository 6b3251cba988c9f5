//! Seed data: the deterministic fixture grades used when no external grade is
//! available, and the static phase catalog shown to learners.

use serde::Serialize;

use crate::domain::{CriterionScores, Deduction, ExternalGrade, Feedback, FixtureHint, Phase};

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn grade(
  criteria: CriterionScores,
  deductions: &[(&str, f64)],
  strengths: &[&str],
  improvements: &[&str],
  suggestions: &[&str],
  examples: &[&str],
) -> ExternalGrade {
  ExternalGrade {
    criteria_scores: criteria,
    deductions: deductions.iter().map(|(r, a)| Deduction::new(*r, *a)).collect(),
    feedback: Feedback {
      strengths: strings(strengths),
      improvements: strings(improvements),
      suggestions: strings(suggestions),
      examples: strings(examples),
    },
  }
}

/// Fixture bands available for a phase. Detailed carries the threshold probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Band {
  High,
  Mid,
  Low,
  ExactNine,
  ExactSix,
  AlmostSix,
}

fn bands_for(phase: Phase) -> &'static [Band] {
  match phase {
    Phase::Detailed => &[Band::High, Band::Mid, Band::Low, Band::ExactNine, Band::ExactSix, Band::AlmostSix],
    Phase::Concise | Phase::Creative => &[Band::High, Band::Mid],
  }
}

/// Pick the band a hint asks for, walking its fallback chain. `Mid` always exists.
fn resolve_band(phase: Phase, hint: FixtureHint) -> Band {
  let chain: &[Band] = match hint {
    FixtureHint::ExactNine => &[Band::ExactNine, Band::High],
    FixtureHint::ExactSix => &[Band::ExactSix, Band::Mid],
    FixtureHint::AlmostSix => &[Band::AlmostSix, Band::Low, Band::Mid],
    FixtureHint::High => &[Band::High],
    FixtureHint::Low => &[Band::Low, Band::Mid],
    FixtureHint::Default => &[Band::Mid],
  };
  let available = bands_for(phase);
  chain.iter().copied().find(|b| available.contains(b)).unwrap_or(Band::Mid)
}

/// Deterministic stand-in for the external grader.
pub fn fixture_grade(phase: Phase, hint: FixtureHint) -> ExternalGrade {
  match (phase, resolve_band(phase, hint)) {
    (Phase::Detailed, Band::High) => grade(
      CriterionScores::new(23.0, 22.0, 22.0, 23.0),
      &[],
      &[
        "Excellent task clarity with specific action required",
        "Well-defined subject matter with clear scope",
        "Comprehensive requirements specified",
        "Excellent contextual information provided",
      ],
      &[], &[], &[],
    ),
    (Phase::Detailed, Band::Low) => grade(
      CriterionScores::new(14.0, 12.0, 10.0, 12.0),
      &[("Missing audience specification", -1.5), ("Ambiguous requirements", -1.0)],
      &["Includes a clear action verb"],
      &[
        "Specify the target audience clearly",
        "Add explicit constraints",
        "Provide more context about the purpose",
      ],
      &[
        "Include 'must' or 'should' statements to clarify requirements",
        "Specify who the guide is for (e.g., high school, college, graduate students)",
      ],
      &["Write a comprehensive study guide for undergraduate biology students that must include at least 5 effective study techniques, 3 time management strategies, and specific examples for laboratory courses."],
    ),
    (Phase::Detailed, Band::ExactNine) => grade(
      CriterionScores::new(23.0, 22.0, 22.0, 23.0),
      &[("Could include more specific constraints", -0.5)],
      &[
        "Excellent task clarity with specific action required",
        "Well-defined subject matter with clear scope",
        "Good requirements specified",
        "Excellent contextual information provided",
      ],
      &["Add more specific constraints about format or content"],
      &["Include specific number of techniques or strategies required"],
      &[],
    ),
    (Phase::Detailed, Band::ExactSix) => grade(
      CriterionScores::new(15.0, 15.0, 15.0, 15.0),
      &[],
      &["Clear action verb", "Basic subject matter defined"],
      &["Add more specific constraints", "Clarify the target audience", "Provide more context"],
      &["Specify exactly what elements must be included", "Define who the content is for more precisely"],
      &["Write a detailed study guide for first-year medical students that must include specific memory techniques, time management strategies, and exam preparation methods with examples for anatomy courses."],
    ),
    (Phase::Detailed, Band::AlmostSix) => grade(
      CriterionScores::new(15.0, 15.0, 14.0, 15.0),
      &[("Missing specific requirements", -0.5)],
      &["Clear action verb", "Basic subject matter defined"],
      &["Add more specific constraints", "Clarify the target audience", "Provide more context"],
      &["Specify exactly what elements must be included", "Define who the content is for more precisely"],
      &["Write a detailed study guide for first-year medical students that must include specific memory techniques, time management strategies, and exam preparation methods with examples for anatomy courses."],
    ),
    (Phase::Detailed, _) => grade(
      CriterionScores::new(18.0, 16.0, 15.0, 16.0),
      &[("Could be more specific about the target audience", -1.0)],
      &["Clear action-oriented task", "Good focus on subject matter"],
      &["Could specify the target audience more clearly", "Consider adding more specific constraints"],
      &[
        "Add specific mention of the educational level of students",
        "Include requirements for specific sections or elements",
      ],
      &["Write a comprehensive guide for first-year college students that must include detailed steps for effective study habits and time management techniques, with at least 3 visual diagrams."],
    ),
    (Phase::Concise, Band::High) => grade(
      CriterionScores::new(24.0, 23.0, 23.0, 22.0),
      &[],
      &[
        "Excellent concise formulation",
        "Clear action with specific subject",
        "Complete request in a single sentence",
        "Good context despite brevity",
      ],
      &[], &[], &[],
    ),
    (Phase::Concise, _) => grade(
      CriterionScores::new(18.0, 16.0, 15.0, 16.0),
      &[],
      &["Good concise formulation", "Clear action verb"],
      &["Could be more specific about the subject", "Add a bit more context while keeping it concise"],
      &["Specify the exact type of guide needed", "Include a specific audience if possible"],
      &["Create a concise study guide for medical students covering key memory techniques."],
    ),
    (Phase::Creative, Band::High) => grade(
      CriterionScores::new(23.0, 22.0, 22.0, 23.0),
      &[],
      &[
        "Excellent creative elements",
        "Clear innovative approach",
        "Well-defined creative task",
        "Good context for creative work",
      ],
      &[], &[], &[],
    ),
    (Phase::Creative, _) => grade(
      CriterionScores::new(18.0, 16.0, 15.0, 16.0),
      &[("Could include more imaginative elements", -0.5)],
      &["Good creative direction", "Clear action verb"],
      &["Add more specific creative elements", "Include more innovative requirements"],
      &["Specify what makes this truly innovative", "Add requirements for unique or original elements"],
      &["Create an innovative study guide that reimagines learning through interactive storytelling, visual metaphors, and personalized memory techniques for different learning styles."],
    ),
  }
}

// ---- Phase catalog ----

pub const UNLOCK_REQUIREMENT: f64 = 9.0;

#[derive(Clone, Debug, Serialize)]
pub struct CriterionInfo {
  pub name: &'static str,
  pub description: &'static str,
  pub weight: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PhaseExample {
  pub prompt: &'static str,
  pub score: f64,
  pub feedback: &'static str,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
  pub name: Phase,
  pub display_name: &'static str,
  pub description: &'static str,
  pub objectives: Vec<&'static str>,
  pub evaluation_criteria: Vec<CriterionInfo>,
  pub examples: Vec<PhaseExample>,
  pub tips: Vec<&'static str>,
  pub order: u8,
  pub unlock_requirement: f64,
}

fn shared_criteria() -> Vec<CriterionInfo> {
  vec![
    CriterionInfo { name: "Task Clarity", description: "How clearly the prompt communicates what needs to be done", weight: 0.3 },
    CriterionInfo { name: "Subject Specificity", description: "How well the prompt defines the subject matter", weight: 0.25 },
    CriterionInfo { name: "Completeness", description: "How thoroughly the prompt covers all necessary aspects", weight: 0.25 },
    CriterionInfo { name: "Context", description: "How well the prompt provides relevant background information", weight: 0.2 },
  ]
}

pub fn phase_info(phase: Phase) -> PhaseInfo {
  match phase {
    Phase::Detailed => PhaseInfo {
      name: phase,
      display_name: "Detailed Phase",
      description: "Learn to create comprehensive, specific prompts that leave little room for misinterpretation.",
      objectives: vec![
        "Clearly define the task and desired outcome",
        "Specify the subject matter in detail",
        "Include all necessary parameters and constraints",
        "Provide relevant context and background information",
      ],
      evaluation_criteria: shared_criteria(),
      examples: vec![PhaseExample {
        prompt: "Create a comprehensive guide for first-time homebuyers in the United States. Include sections on mortgage pre-approval, down payment options, the house hunting process, making an offer, home inspections and closing costs. For each section, provide practical advice, potential pitfalls to avoid, and 2-3 actionable tips. The guide should be accessible to readers with no prior knowledge of real estate transactions.",
        score: 9.5,
        feedback: "Excellent detailed prompt with clear structure and requirements.",
      }],
      tips: vec![
        "Start by clearly stating the main task or question",
        "Specify any constraints or requirements",
        "Include relevant context and background information",
        "Define the format or structure you want the response to follow",
        "Be specific about the subject matter",
      ],
      order: 1,
      unlock_requirement: UNLOCK_REQUIREMENT,
    },
    Phase::Concise => PhaseInfo {
      name: phase,
      display_name: "Concise Phase",
      description: "Master the art of brevity while maintaining clarity and effectiveness.",
      objectives: vec![
        "Communicate the essential requirements with minimal words",
        "Eliminate unnecessary details while preserving clarity",
        "Use precise language and avoid redundancy",
        "Maintain effectiveness despite brevity",
      ],
      evaluation_criteria: shared_criteria(),
      examples: vec![PhaseExample {
        prompt: "Create a first-time homebuyer's checklist for US buyers covering mortgages, inspections, offers and closing costs.",
        score: 9.2,
        feedback: "Excellent concise prompt that maintains all essential information.",
      }],
      tips: vec![
        "Use precise, specific language",
        "Eliminate unnecessary words and phrases",
        "Focus on the most important requirements",
        "Avoid redundancy and repetition",
      ],
      order: 2,
      unlock_requirement: UNLOCK_REQUIREMENT,
    },
    Phase::Creative => PhaseInfo {
      name: phase,
      display_name: "Creative Phase",
      description: "Develop prompts that encourage innovative and unique responses while maintaining direction.",
      objectives: vec![
        "Encourage innovative and unique responses",
        "Balance constraints with freedom for exploration",
        "Inspire the model to approach topics from unusual angles",
        "Maintain direction while allowing for creative expression",
      ],
      evaluation_criteria: shared_criteria(),
      examples: vec![PhaseExample {
        prompt: "Imagine you're a time-traveling real estate agent from 2050 writing a guide for first-time homebuyers today. Highlight the aspects of buying a home that people often overlook, balance practical advice with forward-thinking insights, and use unexpected analogies to make complex concepts accessible.",
        score: 9.7,
        feedback: "Excellent creative prompt that encourages innovation while maintaining clear direction.",
      }],
      tips: vec![
        "Use unusual perspectives or scenarios",
        "Encourage exploration while providing clear boundaries",
        "Ask for unexpected connections or analogies",
        "Specify a unique tone or style",
        "Balance creative freedom with specific requirements",
      ],
      order: 3,
      unlock_requirement: UNLOCK_REQUIREMENT,
    },
  }
}

pub fn phase_catalog() -> Vec<PhaseInfo> {
  Phase::ORDER.iter().map(|p| phase_info(*p)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_hint_uses_mid_fixture() {
    let g = fixture_grade(Phase::Detailed, FixtureHint::Default);
    assert_eq!(g.criteria_scores.total(), 65.0);
    let g = fixture_grade(Phase::Concise, FixtureHint::Default);
    assert_eq!(g.criteria_scores.total(), 65.0);
    assert!(g.deductions.is_empty());
  }

  #[test]
  fn missing_bands_fall_back() {
    // Concise has no low or threshold fixtures.
    assert_eq!(fixture_grade(Phase::Concise, FixtureHint::Low), fixture_grade(Phase::Concise, FixtureHint::Default));
    assert_eq!(fixture_grade(Phase::Concise, FixtureHint::AlmostSix), fixture_grade(Phase::Concise, FixtureHint::Default));
    assert_eq!(fixture_grade(Phase::Creative, FixtureHint::ExactNine), fixture_grade(Phase::Creative, FixtureHint::High));
    assert_eq!(fixture_grade(Phase::Detailed, FixtureHint::ExactSix).criteria_scores.total(), 60.0);
  }

  #[test]
  fn fixtures_respect_grade_bounds() {
    let hints = [
      FixtureHint::ExactNine, FixtureHint::ExactSix, FixtureHint::AlmostSix,
      FixtureHint::High, FixtureHint::Low, FixtureHint::Default,
    ];
    for phase in Phase::ORDER {
      for hint in hints {
        let g = fixture_grade(phase, hint);
        assert!(crate::grader::check_grade(&g).is_ok(), "{phase} {hint:?}");
      }
    }
  }

  #[test]
  fn catalog_is_ordered() {
    let cat = phase_catalog();
    assert_eq!(cat.iter().map(|p| p.order).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(cat.iter().all(|p| p.unlock_requirement == 9.0));
  }
}
