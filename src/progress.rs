//! Per-user phase progression: attempts, best score, completion and unlocks.
//!
//! The state machine is plain data; `AppState` serializes concurrent updates
//! for the same user by holding its write guard across `record_evaluation`.

use serde::{Deserialize, Serialize};

use crate::domain::Phase;
use crate::error::ProgressError;
use crate::seeds::UNLOCK_REQUIREMENT;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseProgress {
  pub locked: bool,
  pub completed: bool,
  pub attempts: u32,
  pub best_score: f64,
}

impl PhaseProgress {
  fn new(locked: bool) -> Self {
    Self { locked, completed: false, attempts: 0, best_score: 0.0 }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseMap {
  pub detailed: PhaseProgress,
  pub concise: PhaseProgress,
  pub creative: PhaseProgress,
}

impl PhaseMap {
  pub fn get(&self, phase: Phase) -> &PhaseProgress {
    match phase {
      Phase::Detailed => &self.detailed,
      Phase::Concise => &self.concise,
      Phase::Creative => &self.creative,
    }
  }

  fn get_mut(&mut self, phase: Phase) -> &mut PhaseProgress {
    match phase {
      Phase::Detailed => &mut self.detailed,
      Phase::Concise => &mut self.concise,
      Phase::Creative => &mut self.creative,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
  pub current_phase: Phase,
  pub phase_progress: PhaseMap,
  pub onboarding_completed: bool,
}

impl Default for ProgressState {
  fn default() -> Self {
    Self {
      current_phase: Phase::Detailed,
      phase_progress: PhaseMap {
        detailed: PhaseProgress::new(false),
        concise: PhaseProgress::new(true),
        creative: PhaseProgress::new(true),
      },
      onboarding_completed: false,
    }
  }
}

/// Slice returned to the caller after one evaluation was recorded.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
  pub phase: Phase,
  pub attempts: u32,
  pub best_score: f64,
  pub completed: bool,
  /// Set only on the evaluation that unlocked it.
  pub phase_unlocked: Option<Phase>,
}

impl ProgressState {
  pub fn phase(&self, phase: Phase) -> &PhaseProgress {
    self.phase_progress.get(phase)
  }

  /// Apply one scored evaluation. Every accepted evaluation counts, even for
  /// a phase that is still locked; only selection is gated by the lock.
  pub fn record_evaluation(&mut self, phase: Phase, score: f64) -> ProgressUpdate {
    let entry = self.phase_progress.get_mut(phase);
    entry.attempts += 1;
    if score > entry.best_score {
      entry.best_score = score;
    }
    let newly_completed = !entry.completed && score >= UNLOCK_REQUIREMENT;
    if newly_completed {
      entry.completed = true;
    }
    let snapshot = *entry;

    let mut phase_unlocked = None;
    if newly_completed {
      if let Some(next) = phase.next() {
        let next_entry = self.phase_progress.get_mut(next);
        if next_entry.locked {
          next_entry.locked = false;
          phase_unlocked = Some(next);
        }
      }
    }

    ProgressUpdate {
      phase,
      attempts: snapshot.attempts,
      best_score: snapshot.best_score,
      completed: snapshot.completed,
      phase_unlocked,
    }
  }

  pub fn select_phase(&mut self, phase: Phase) -> Result<(), ProgressError> {
    if self.phase(phase).locked {
      return Err(ProgressError::PhaseLocked(phase));
    }
    self.current_phase = phase;
    Ok(())
  }

  pub fn complete_onboarding(&mut self) {
    self.onboarding_completed = true;
  }
}
