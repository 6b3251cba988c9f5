//! Phase-specific rule validation of submitted prompts.
//!
//! `validate` never stops at the first problem: every failed rule contributes
//! its own message so the learner sees all of them at once.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::domain::Phase;
use crate::util::{lexicon_regex, sentence_count, word_count};

pub const DETAILED_MIN_WORDS: usize = 20;
pub const CONCISE_MAX_WORDS: usize = 18;

pub(crate) static TASK_VERBS: Lazy<Regex> = Lazy::new(|| lexicon_regex(&[
  "write", "create", "explain", "describe", "generate", "make", "develop", "discuss",
  "list", "outline", "prepare", "design", "compose", "draft", "present",
]));

pub(crate) static CONSTRAINT_TERMS: Lazy<Regex> =
  Lazy::new(|| lexicon_regex(&["must", "should", "need to", "has to", "require"]));

pub(crate) static AUDIENCE_TERMS: Lazy<Regex> = Lazy::new(|| lexicon_regex(&[
  "for", "audience", "users", "readers", "people", "students", "professionals",
]));

pub(crate) static CREATIVE_TERMS: Lazy<Regex> = Lazy::new(|| lexicon_regex(&[
  "imagine", "creative", "innovative", "unique", "original", "novel", "envision", "inspiring",
  "transformative", "revolutionary", "fresh", "inventive", "pioneering",
]));

pub(crate) static SUBTLE_CREATIVE_TERMS: Lazy<Regex> = Lazy::new(|| lexicon_regex(&[
  "different", "new", "better", "improved", "enhanced", "advanced", "modern", "future",
  "tomorrow", "beyond", "reimagine", "rethink",
]));

/// How strongly a text signals creativity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreativitySignal {
  Explicit,
  /// Only the subtler lexicon matched. Accepted, but feedback nudges for more.
  Weak,
  Missing,
}

pub fn creativity_signal(text: &str) -> CreativitySignal {
  if CREATIVE_TERMS.is_match(text) {
    CreativitySignal::Explicit
  } else if SUBTLE_CREATIVE_TERMS.is_match(text) {
    CreativitySignal::Weak
  } else {
    CreativitySignal::Missing
  }
}

#[instrument(level = "debug", skip(text), fields(%phase, text_len = text.len()))]
pub fn validate(text: &str, phase: Phase) -> Vec<String> {
  let mut errors = Vec::new();

  if text.trim().is_empty() {
    errors.push("Prompt text is required".to_string());
    return errors;
  }

  let words = word_count(text);

  if !TASK_VERBS.is_match(text) {
    errors.push("Prompt must request a specific action (e.g., write, create, explain)".to_string());
  }

  match phase {
    Phase::Detailed => {
      if words < DETAILED_MIN_WORDS {
        errors.push(if words == DETAILED_MIN_WORDS - 1 {
          format!("Detailed phase requires {DETAILED_MIN_WORDS} words (current: {words}, add one more word)")
        } else {
          format!("Detailed phase requires at least {DETAILED_MIN_WORDS} words (current: {words})")
        });
      }
      if !CONSTRAINT_TERMS.is_match(text) {
        errors.push("Detailed phase requires explicit constraints (using words like \"must\" or \"should\")".to_string());
      }
      if !AUDIENCE_TERMS.is_match(text) {
        errors.push("Detailed phase requires specifying target audience".to_string());
      }
    }
    Phase::Concise => {
      if words > CONCISE_MAX_WORDS {
        errors.push(if words == CONCISE_MAX_WORDS + 1 {
          format!("Concise phase requires {CONCISE_MAX_WORDS} or fewer words (current: {words}, remove one word)")
        } else {
          format!("Concise phase requires {CONCISE_MAX_WORDS} words or fewer (current: {words})")
        });
      }
      match sentence_count(text) {
        1 => {}
        0 => errors.push("Prompt must contain exactly one sentence".to_string()),
        n => errors.push(format!("Concise phase requires exactly one sentence (current: {n} sentences)")),
      }
    }
    Phase::Creative => match creativity_signal(text) {
      CreativitySignal::Explicit => {}
      CreativitySignal::Weak => {
        warn!(target: "evaluation", "Subtle creativity only; explicit creative terms would be stronger");
      }
      CreativitySignal::Missing => errors.push(
        "Creative phase requires imaginative elements (using words like \"imagine\", \"innovative\", or similar creative terms)".to_string(),
      ),
    },
  }

  if !errors.is_empty() {
    debug!(target: "evaluation", words, error_count = errors.len(), "Validation rejected prompt");
  }
  errors
}
