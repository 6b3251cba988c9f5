//! Feedback synthesis from criteria bands, deductions and the phase rubric.
//!
//! Generated sentences always take precedence over the baseline feedback that
//! came with the grade; both are merged with exact-text de-duplication and
//! capped per list.

use tracing::{debug, instrument};

use crate::domain::{Criterion, CriterionScores, Deduction, Feedback, Phase};
use crate::rubric::{generic_improvement, Level, PhaseRubric, Rubrics};
use crate::util::{merge_capped, word_count};
use crate::validator::{creativity_signal, CreativitySignal, AUDIENCE_TERMS, CONSTRAINT_TERMS};

pub const MAX_STRENGTHS: usize = 4;
pub const MAX_IMPROVEMENTS: usize = 4;
pub const MAX_SUGGESTIONS: usize = 3;

/// Above this many words a concise prompt gets a softer length nudge.
pub const CONCISE_ADVISORY_WORDS: usize = 15;
/// Scores below this get a before/after example pair.
pub const EXAMPLE_SCORE_CEILING: f64 = 8.0;
const EXAMPLE_LOW_CEILING: f64 = 6.0;

fn strengths(rubric: &PhaseRubric, criteria: &CriterionScores) -> Vec<String> {
  Criterion::ALL
    .iter()
    .filter(|c| criteria.get(**c) >= 15.0)
    .map(|c| rubric.criterion(*c).at(Level::for_score(criteria.get(*c))).to_string())
    .collect()
}

fn push_unique(list: &mut Vec<String>, item: &str) {
  if !list.iter().any(|s| s == item) {
    list.push(item.to_string());
  }
}

fn improvements(
  rubric: &PhaseRubric,
  criteria: &CriterionScores,
  deductions: &[Deduction],
  phase: Phase,
  text: &str,
) -> Vec<String> {
  let mut out: Vec<String> = Criterion::ALL
    .iter()
    .filter(|c| criteria.get(**c) < 15.0)
    .map(|c| generic_improvement(*c).to_string())
    .collect();

  match phase {
    Phase::Detailed => {
      if !CONSTRAINT_TERMS.is_match(text) {
        out.push(rubric.improvements.constraints.clone());
      }
      if !AUDIENCE_TERMS.is_match(text) {
        out.push(rubric.improvements.audience.clone());
      }
    }
    Phase::Concise => {
      if word_count(text) > CONCISE_ADVISORY_WORDS {
        if let Some(s) = &rubric.improvements.word_count {
          out.push(s.clone());
        }
      }
    }
    Phase::Creative => {
      if creativity_signal(text) != CreativitySignal::Explicit {
        if let Some(s) = &rubric.improvements.innovation {
          out.push(s.clone());
        }
      }
    }
  }

  for d in deductions {
    let reason = d.reason.to_lowercase();
    if reason.contains("audience") {
      push_unique(&mut out, &rubric.improvements.audience);
    } else if reason.contains("ambiguous") {
      push_unique(&mut out, &rubric.improvements.ambiguity);
    } else if reason.contains("constraints") {
      push_unique(&mut out, &rubric.improvements.constraints);
    }
  }
  out
}

fn suggestions(rubric: &PhaseRubric, improvements: &[String], phase: Phase) -> Vec<String> {
  let any = |needle: &str| improvements.iter().any(|i| i.contains(needle));
  let mut out = Vec::new();
  if any("audience") {
    out.push(rubric.suggestions.audience.clone());
  }
  if any("constraints") {
    out.push(rubric.suggestions.constraints.clone());
  }
  if phase == Phase::Creative && any("innovative") {
    out.extend(rubric.suggestions.creativity.iter().cloned());
    out.extend(rubric.suggestions.innovation.iter().cloned());
  }
  if phase == Phase::Concise && any("word") {
    out.extend(rubric.suggestions.precision.iter().cloned());
  }
  out
}

fn examples(rubric: &PhaseRubric, score: f64, text: &str) -> Option<Vec<String>> {
  if score >= EXAMPLE_SCORE_CEILING {
    return None;
  }
  let level = if score < EXAMPLE_LOW_CEILING { Level::Low } else { Level::Mid };
  Some(vec![
    format!("Before: \"{}\"", text),
    format!("After: \"{}\"", rubric.examples.at(level)),
  ])
}

#[instrument(level = "debug", skip_all, fields(%phase, score = score))]
pub fn synthesize(
  rubrics: &Rubrics,
  criteria: &CriterionScores,
  deductions: &[Deduction],
  score: f64,
  phase: Phase,
  text: &str,
  baseline: &Feedback,
) -> Feedback {
  let rubric = rubrics.for_phase(phase);

  let generated_improvements = improvements(rubric, criteria, deductions, phase, text);
  let generated_suggestions = suggestions(rubric, &generated_improvements, phase);

  let feedback = Feedback {
    strengths: merge_capped(strengths(rubric, criteria), &baseline.strengths, MAX_STRENGTHS),
    improvements: merge_capped(generated_improvements, &baseline.improvements, MAX_IMPROVEMENTS),
    suggestions: merge_capped(generated_suggestions, &baseline.suggestions, MAX_SUGGESTIONS),
    examples: examples(rubric, score, text).unwrap_or_else(|| baseline.examples.clone()),
  };

  debug!(
    target: "evaluation",
    strengths = feedback.strengths.len(),
    improvements = feedback.improvements.len(),
    suggestions = feedback.suggestions.len(),
    examples = feedback.examples.len(),
    "Feedback synthesized"
  );
  feedback
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scoring::{AMBIGUOUS_REASON, MISSING_AUDIENCE_REASON};

  fn rubrics() -> Rubrics {
    Rubrics::default()
  }

  #[test]
  fn strengths_follow_bands_and_cap() {
    let c = CriterionScores::new(23.0, 16.0, 10.0, 20.0);
    let baseline = Feedback { strengths: vec!["Good focus".into(), "Extra".into()], ..Default::default() };
    let fb = synthesize(&rubrics(), &c, &[], 9.0, Phase::Detailed, "Write it for kids, must", &baseline);
    assert_eq!(fb.strengths, vec![
      "Excellent task clarity with specific action required",
      "Good subject focus",
      "Excellent contextual information provided",
      "Good focus",
    ]);
  }

  #[test]
  fn detailed_improvements_and_suggestions() {
    let c = CriterionScores::new(14.0, 12.0, 10.0, 12.0);
    let deductions = vec![
      Deduction::new("Missing audience specification", -1.5),
      Deduction::new("Ambiguous requirements", -1.0),
    ];
    let fb = synthesize(&rubrics(), &c, &deductions, 4.3, Phase::Detailed, "Write a guide about studying.", &Feedback::default());
    // Four generic sentences fill the cap before the phase-specific ones.
    assert_eq!(fb.improvements, vec![
      "Improve task clarity with a specific action verb",
      "Define the subject matter more clearly",
      "Include more comprehensive requirements",
      "Provide more contextual information",
    ]);
    // Suggestions scan the full generated list, not the capped one.
    assert_eq!(fb.suggestions.len(), 2);
    assert!(fb.suggestions[0].contains("who the content is for"));
    assert_eq!(fb.examples, vec![
      "Before: \"Write a guide about studying.\"",
      "After: \"Write a guide about studying.\"",
    ]);
  }

  #[test]
  fn deduction_reasons_map_to_rubric_sentences() {
    let c = CriterionScores::new(18.0, 16.0, 15.0, 16.0);
    let deductions = vec![
      Deduction::new(AMBIGUOUS_REASON, -1.0),
      Deduction::new("Could include more specific constraints", -0.5),
      Deduction::new(MISSING_AUDIENCE_REASON, -0.5),
    ];
    let text = "Write various tips for nurses; they must be short.";
    let fb = synthesize(&rubrics(), &c, &deductions, 6.3, Phase::Detailed, text, &Feedback::default());
    let r = rubrics();
    assert_eq!(fb.improvements, vec![
      r.detailed.improvements.ambiguity.clone(),
      r.detailed.improvements.constraints.clone(),
      r.detailed.improvements.audience.clone(),
    ]);
  }

  #[test]
  fn any_constraint_or_audience_term_satisfies_detailed_checks() {
    let c = CriterionScores::new(18.0, 16.0, 15.0, 16.0);
    let text = "Write a lab safety briefing that students need to read and that has to require goggles.";
    let fb = synthesize(&rubrics(), &c, &[], 7.0, Phase::Detailed, text, &Feedback::default());
    assert!(fb.improvements.is_empty(), "unexpected: {:?}", fb.improvements);

    let fb = synthesize(&rubrics(), &c, &[], 7.0, Phase::Detailed, "Write a lab safety briefing.", &Feedback::default());
    let r = rubrics();
    assert_eq!(fb.improvements, vec![r.detailed.improvements.constraints.clone(), r.detailed.improvements.audience.clone()]);
  }

  #[test]
  fn concise_length_nudge_triggers_precision_suggestion() {
    let c = CriterionScores::new(18.0, 16.0, 15.0, 16.0);
    let text = "Write a short and friendly welcome note for new hospital volunteers about parking and lunch today.";
    assert_eq!(word_count(text), 16);
    let fb = synthesize(&rubrics(), &c, &[], 6.5, Phase::Concise, text, &Feedback::default());
    assert_eq!(fb.improvements, vec!["Ensure the prompt stays under 18 words"]);
    assert_eq!(fb.suggestions, vec!["Replace general terms with specific ones"]);
  }

  #[test]
  fn creative_weak_signal_yields_two_suggestions() {
    let c = CriterionScores::new(18.0, 16.0, 15.0, 16.0);
    let fb = synthesize(&rubrics(), &c, &[], 6.5, Phase::Creative, "Design a better study plan for teens.", &Feedback::default());
    assert_eq!(fb.improvements, vec!["Include more specific innovative elements"]);
    assert_eq!(fb.suggestions, vec![
      "Use more explicit creative terms (e.g., 'reimagine', 'transform')",
      "Specify what makes this truly innovative",
    ]);
  }

  #[test]
  fn generated_content_wins_over_baseline_at_cap() {
    let c = CriterionScores::new(18.0, 16.0, 15.0, 16.0);
    let baseline = Feedback {
      strengths: vec![],
      improvements: vec!["b1".into(), "b2".into(), "b3".into(), "b4".into()],
      suggestions: vec!["s1".into(), "s2".into(), "s3".into()],
      examples: vec!["kept".into()],
    };
    let fb = synthesize(&rubrics(), &c, &[], 8.5, Phase::Creative, "Imagine a city.", &baseline);
    assert_eq!(fb.improvements, vec!["b1", "b2", "b3", "b4"]);
    assert_eq!(fb.suggestions, vec!["s1", "s2", "s3"]);
    assert_eq!(fb.examples, vec!["kept"], "score ≥ 8.0 passes baseline examples through");

    let fb = synthesize(&rubrics(), &c, &[], 6.0, Phase::Creative, "Design a new city.", &baseline);
    assert_eq!(fb.improvements[0], "Include more specific innovative elements");
    assert_eq!(fb.improvements.len(), 4);
    assert_eq!(fb.suggestions[..2], [
      "Use more explicit creative terms (e.g., 'reimagine', 'transform')".to_string(),
      "Specify what makes this truly innovative".to_string(),
    ]);
    assert!(fb.examples[1].contains("Design a creative study approach"), "mid template at 6.0");
  }
}
