//! Loading agent configuration (grader prompts + rubric tables) from TOML.
//!
//! See `AgentConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::rubric::Rubrics;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Replaces the built-in rubric table of any phase present in the file.
  #[serde(default)]
  pub rubrics: Rubrics,
}

/// Prompts used by the external grader. Defaults ask for the four-criterion
/// 0–25 shape the scoring engine consumes.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub grader_system: String,
  pub grader_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      grader_system: "You are an expert prompt engineering evaluator grading a learner's prompt for the '{phase}' phase. Respond ONLY with strict JSON.".into(),
      grader_user_template: "Phase: {phase}\nPrompt: {prompt}\n\nReturn JSON with fields:\n\
        \"criteriaScores\": {\"taskClarity\", \"subjectSpecificity\", \"completeness\", \"context\"} each a number 0-25,\n\
        \"deductions\": [{\"reason\": string, \"amount\": number <= 0}],\n\
        \"feedback\": {\"strengths\": [string], \"improvements\": [string], \"suggestions\": [string], \"examples\": [string]}.".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "prompt_trainer", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "prompt_trainer", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "prompt_trainer", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
