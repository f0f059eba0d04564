use thiserror::Error;

use crate::session::Phase;

/// Errors raised by the workout engine's control surface
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("workout has no exercises")]
    EmptyWorkout,

    #[error("cannot {action} while {phase}")]
    InvalidAction { action: &'static str, phase: Phase },

    #[error("session already finished")]
    AlreadyFinished,

    #[error("session was cancelled")]
    Cancelled,

    #[error("share failed: {0}")]
    Share(String),
}

/// Errors raised while loading a workout definition
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workout \"{0}\" has no exercises")]
    Empty(String),

    #[error("no bundled workout named \"{0}\"")]
    UnknownBundled(String),
}

/// Errors reported by injected host capabilities (display, share)
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
