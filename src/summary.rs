use std::time::{Duration, SystemTime};

use crate::profile::Profile;
use crate::session::SessionConfig;
use crate::workout::WorkoutDefinition;

/// Totals for a finished session. Calories are a MET-based estimate, not a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub total_duration_secs: u64,
    pub active_duration_secs: u64,
    pub rest_duration_secs: u64,
    pub calories_burned: u32,
}

impl SessionSummary {
    pub fn compute(
        workout: &WorkoutDefinition,
        profile: &Profile,
        config: &SessionConfig,
        started_at: SystemTime,
        finished_at: SystemTime,
    ) -> Self {
        let active_duration_secs = active_duration_secs(workout, config);
        let rest_duration_secs =
            workout.len().saturating_sub(1) as u64 * u64::from(config.rest_secs);

        Self {
            total_duration_secs: round_secs(
                finished_at
                    .duration_since(started_at)
                    .unwrap_or(Duration::ZERO),
            ),
            active_duration_secs,
            rest_duration_secs,
            calories_burned: estimate_calories(config.met_value, profile, active_duration_secs),
        }
    }
}

pub fn active_duration_secs(workout: &WorkoutDefinition, config: &SessionConfig) -> u64 {
    workout
        .exercises
        .iter()
        .map(|e| {
            u64::from(
                e.duration_secs()
                    .unwrap_or(config.estimated_rep_exercise_secs),
            )
        })
        .sum()
}

/// `MET * kg * hours`, rounded to whole kilocalories
pub fn estimate_calories(met_value: f64, profile: &Profile, active_secs: u64) -> u32 {
    let kcal = met_value * profile.weight_in_kg() * (active_secs as f64 / 3600.0);
    kcal.round().max(0.0) as u32
}

fn round_secs(d: Duration) -> u64 {
    (d.as_millis() as f64 / 1000.0).round() as u64
}

/// `Xm Ys`
pub fn format_time(total_secs: u64) -> String {
    format!("{}m {}s", total_secs / 60, total_secs % 60)
}

pub fn share_text(title: &str, summary: &SessionSummary) -> String {
    format!(
        "I just finished the \"{}\" workout in {} with repline! I burned an estimated {} calories. #FitnessJourney",
        title,
        format_time(summary.total_duration_secs),
        summary.calories_burned
    )
}
