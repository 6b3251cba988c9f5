//! Small utility helpers used across modules.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Whitespace-separated tokens, empty tokens dropped.
pub fn word_count(text: &str) -> usize {
  text.split_whitespace().count()
}

/// Fragments between runs of `.`, `!`, `?` that contain something besides whitespace.
pub fn sentence_count(text: &str) -> usize {
  static RE_TERMINATORS: OnceCell<Regex> = OnceCell::new();
  let re = RE_TERMINATORS.get_or_init(|| Regex::new(r"[.!?]+").expect("static regex"));
  re.split(text).filter(|s| !s.trim().is_empty()).count()
}

/// Build a case-insensitive, word-bounded alternation over `terms`.
pub fn lexicon_regex(terms: &[&str]) -> Regex {
  let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
  Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("lexicon terms are escaped")
}

/// Order-preserving merge with exact-text de-duplication, capped at `cap`.
/// Items from `primary` always come before items from `secondary`.
pub fn merge_capped(primary: Vec<String>, secondary: &[String], cap: usize) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(cap);
  for item in primary.into_iter().chain(secondary.iter().cloned()) {
    if out.len() == cap { break; }
    if !out.contains(&item) {
      out.push(item);
    }
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) { end -= 1; }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_words_and_sentences() {
    assert_eq!(word_count("  Write   a guide \n about studying. "), 5);
    assert_eq!(word_count("   "), 0);
    assert_eq!(sentence_count("Write a guide. Then stop!"), 2);
    assert_eq!(sentence_count("Write a guide..."), 1);
    assert_eq!(sentence_count("?!. "), 0);
    assert_eq!(sentence_count("no terminator at all"), 1);
  }

  #[test]
  fn lexicon_matches_whole_words_only() {
    let re = lexicon_regex(&["for", "need to"]);
    assert!(re.is_match("A guide FOR students"));
    assert!(re.is_match("you need to cite"));
    assert!(!re.is_match("a formal tone"));
  }

  #[test]
  fn merge_prefers_primary_and_dedups() {
    let merged = merge_capped(
      vec!["a".into(), "b".into(), "a".into()],
      &["b".into(), "c".into(), "d".into(), "e".into()],
      4,
    );
    assert_eq!(merged, vec!["a", "b", "c", "d"]);
  }

  #[test]
  fn fills_templates_and_truncates() {
    assert_eq!(fill_template("{phase}: {text}", &[("phase", "concise"), ("text", "hi")]), "concise: hi");
    assert!(trunc_for_log("abcdef", 3).starts_with("abc…"));
  }
}
