use std::fmt;

use tracing::{debug, info, warn};

use crate::capability::Capabilities;
use crate::error::EngineError;
use crate::profile::Profile;
use crate::session::{Phase, SessionConfig, SessionState};
use crate::summary::{share_text, SessionSummary};
use crate::workout::{Exercise, ExerciseKind, WorkoutDefinition};

pub type Observer = Box<dyn FnMut(&SessionState)>;
pub type CompletionCallback = Box<dyn FnOnce(&SessionSummary)>;

/// Drives one guided workout from Ready to Finished under a 1 second tick.
///
/// The host calls [`WorkoutEngine::tick`] once per second and forwards user
/// actions; nothing else mutates the session. After [`WorkoutEngine::cancel`]
/// the state is gone and every further tick is ignored.
pub struct WorkoutEngine {
    workout: WorkoutDefinition,
    profile: Profile,
    config: SessionConfig,
    caps: Capabilities,
    state: Option<SessionState>,
    summary: Option<SessionSummary>,
    clock_running: bool,
    display_held: bool,
    dismissed: bool,
    observer: Option<Observer>,
    on_complete: Option<CompletionCallback>,
}

impl WorkoutEngine {
    pub fn new(
        workout: WorkoutDefinition,
        profile: Profile,
        config: SessionConfig,
    ) -> Result<Self, EngineError> {
        Self::with_capabilities(workout, profile, config, Capabilities::default())
    }

    /// Start a session. Fails fast on an empty workout.
    pub fn with_capabilities(
        workout: WorkoutDefinition,
        profile: Profile,
        config: SessionConfig,
        mut caps: Capabilities,
    ) -> Result<Self, EngineError> {
        if workout.is_empty() {
            return Err(EngineError::EmptyWorkout);
        }

        let display_held = match caps.display.enter_full_screen() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not enter full screen, continuing without it");
                false
            }
        };

        let state = SessionState::new(caps.clock.now(), config.ready_secs);
        info!(
            title = %workout.title,
            exercises = workout.len(),
            "workout session started"
        );

        Ok(Self {
            workout,
            profile,
            config,
            caps,
            state: Some(state),
            summary: None,
            clock_running: true,
            display_held,
            dismissed: false,
            observer: None,
            on_complete: None,
        })
    }

    /// Register a callback invoked with the new state after every mutation
    pub fn on_change<F>(&mut self, observer: F)
    where
        F: FnMut(&SessionState) + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    /// Register the callback fired once when the finished session is dismissed
    pub fn on_complete<F>(&mut self, callback: F)
    where
        F: FnOnce(&SessionSummary) + 'static,
    {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn workout(&self) -> &WorkoutDefinition {
        &self.workout
    }

    /// `None` once the session has been cancelled
    pub fn state(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.state.as_ref().map(|s| s.phase)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.current_index)
    }

    pub fn time_left_secs(&self) -> Option<u32> {
        self.state.as_ref().map(|s| s.time_left_secs)
    }

    pub fn is_paused(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.paused)
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock_running
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_none()
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Available only once the session is Finished
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.state
            .as_ref()
            .and_then(|s| self.workout.exercises.get(s.current_index))
    }

    pub fn next_exercise(&self) -> Option<&Exercise> {
        self.state
            .as_ref()
            .and_then(|s| self.workout.exercises.get(s.current_index + 1))
    }

    /// Advance the countdown by one second, firing a transition when it runs out
    pub fn tick(&mut self) {
        if !self.clock_running {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.paused || !state.phase.is_timed() {
            return;
        }

        if state.time_left_secs > 1 {
            state.time_left_secs -= 1;
        } else {
            state.time_left_secs = 0;
            self.expire();
        }
        self.notify();
    }

    /// Pause or resume the countdown. Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> Result<bool, EngineError> {
        let state = self.state.as_mut().ok_or(EngineError::Cancelled)?;
        if !state.phase.is_pausable() {
            return Err(EngineError::InvalidAction {
                action: "toggle pause",
                phase: state.phase,
            });
        }

        state.paused = !state.paused;
        let paused = state.paused;
        debug!(paused, "pause toggled");
        self.notify();
        Ok(paused)
    }

    /// Mark the current rep-based exercise as done
    pub fn confirm_rep_based_exercise(&mut self) -> Result<(), EngineError> {
        let state = self.state.as_ref().ok_or(EngineError::Cancelled)?;
        if state.phase != Phase::RepConfirm {
            return Err(EngineError::InvalidAction {
                action: "confirm exercise",
                phase: state.phase,
            });
        }

        self.set_phase(Phase::Completed, self.config.completed_secs);
        self.notify();
        Ok(())
    }

    /// Abort before Finished: stops the clock and discards the state without a summary
    pub fn cancel(&mut self) -> Result<(), EngineError> {
        let Some(state) = self.state.as_ref() else {
            return Ok(());
        };
        if state.phase == Phase::Finished {
            return Err(EngineError::AlreadyFinished);
        }

        info!(
            index = state.current_index,
            phase = %state.phase,
            "workout session cancelled"
        );
        self.clock_running = false;
        self.state = None;
        self.release_display();
        Ok(())
    }

    /// Leave the Finished phase, firing the completion callback once
    pub fn dismiss(&mut self) -> Result<(), EngineError> {
        let state = self.state.as_ref().ok_or(EngineError::Cancelled)?;
        if state.phase != Phase::Finished {
            return Err(EngineError::InvalidAction {
                action: "dismiss",
                phase: state.phase,
            });
        }
        if self.dismissed {
            return Ok(());
        }

        self.dismissed = true;
        self.release_display();
        if let (Some(callback), Some(summary)) = (self.on_complete.take(), self.summary.as_ref()) {
            callback(summary);
        }
        Ok(())
    }

    /// Hand the success message to the share capability. Finished sessions only.
    pub fn share(&mut self) -> Result<String, EngineError> {
        let phase = self.phase().ok_or(EngineError::Cancelled)?;
        let summary = self.summary.as_ref().ok_or(EngineError::InvalidAction {
            action: "share",
            phase,
        })?;

        let text = share_text(&self.workout.title, summary);
        self.caps
            .share
            .share(&text)
            .map_err(|e| EngineError::Share(e.to_string()))?;
        Ok(text)
    }

    fn expire(&mut self) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        let (index, phase) = (state.current_index, state.phase);

        match phase {
            Phase::Ready => self.enter_exercise(0),
            Phase::Exercising => self.set_phase(Phase::Completed, self.config.completed_secs),
            Phase::Resting => self.enter_exercise(index + 1),
            Phase::Completed if index + 1 < self.workout.len() => {
                self.set_phase(Phase::Resting, self.config.rest_secs)
            }
            Phase::Completed => self.finish(),
            Phase::RepConfirm | Phase::Finished => {}
        }
    }

    fn enter_exercise(&mut self, index: usize) {
        let Some(exercise) = self.workout.exercises.get(index) else {
            return;
        };
        let (phase, time_left) = match exercise.kind {
            ExerciseKind::Timed { duration_secs } => (Phase::Exercising, duration_secs),
            ExerciseKind::RepBased { .. } => (Phase::RepConfirm, 0),
        };

        if let Some(state) = self.state.as_mut() {
            state.current_index = index;
        }
        self.set_phase(phase, time_left);
    }

    fn set_phase(&mut self, phase: Phase, time_left_secs: u32) {
        if let Some(state) = self.state.as_mut() {
            debug!(
                from = %state.phase,
                to = %phase,
                index = state.current_index,
                "phase transition"
            );
            state.phase = phase;
            state.time_left_secs = time_left_secs;
        }
    }

    fn finish(&mut self) {
        let Some(started_at) = self.state.as_ref().map(|s| s.started_at) else {
            return;
        };
        let summary = SessionSummary::compute(
            &self.workout,
            &self.profile,
            &self.config,
            started_at,
            self.caps.clock.now(),
        );

        self.set_phase(Phase::Finished, 0);
        if let Some(state) = self.state.as_mut() {
            state.paused = false;
        }
        self.clock_running = false;
        info!(
            total_secs = summary.total_duration_secs,
            active_secs = summary.active_duration_secs,
            calories = summary.calories_burned,
            "workout session finished"
        );
        self.summary = Some(summary);
    }

    fn notify(&mut self) {
        if let (Some(observer), Some(state)) = (self.observer.as_mut(), self.state.as_ref()) {
            observer(state);
        }
    }

    fn release_display(&mut self) {
        if !self.display_held {
            return;
        }
        self.display_held = false;
        if let Err(e) = self.caps.display.exit_full_screen() {
            warn!(error = %e, "could not leave full screen");
        }
    }
}

impl Drop for WorkoutEngine {
    fn drop(&mut self) {
        self.release_display();
    }
}

impl fmt::Debug for WorkoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkoutEngine")
            .field("title", &self.workout.title)
            .field("state", &self.state)
            .field("summary", &self.summary)
            .field("clock_running", &self.clock_running)
            .field("dismissed", &self.dismissed)
            .finish_non_exhaustive()
    }
}
