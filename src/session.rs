use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Timing and estimation constants for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ready_secs: u32,
    pub rest_secs: u32,
    pub completed_secs: u32,
    /// Active time credited to a rep-based exercise in the summary
    pub estimated_rep_exercise_secs: u32,
    pub met_value: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ready_secs: 5,
            rest_secs: 15,
            completed_secs: 3,
            estimated_rep_exercise_secs: 45,
            met_value: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Ready,
    Exercising,
    RepConfirm,
    Resting,
    Completed,
    Finished,
}

impl Phase {
    /// Phases whose countdown may be frozen by the user
    pub fn is_pausable(self) -> bool {
        matches!(self, Phase::Exercising | Phase::Resting)
    }

    /// Phases that advance on the tick clock rather than on user input
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            Phase::Ready | Phase::Exercising | Phase::Resting | Phase::Completed
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub current_index: usize,
    pub phase: Phase,
    pub time_left_secs: u32,
    pub paused: bool,
    pub started_at: SystemTime,
}

impl SessionState {
    pub fn new(started_at: SystemTime, ready_secs: u32) -> Self {
        Self {
            current_index: 0,
            phase: Phase::Ready,
            time_left_secs: ready_secs,
            paused: false,
            started_at,
        }
    }
}
