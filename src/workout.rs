use include_dir::{include_dir, Dir};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

use crate::error::PlanError;

static PLAN_DIR: Dir = include_dir!("src/plans");

/// How an exercise is measured and therefore how the session advances past it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExerciseKind {
    /// Counted down by the tick clock
    Timed { duration_secs: u32 },
    /// Finished when the user confirms the sets are done
    RepBased { sets: String, reps: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawExercise")]
pub struct Exercise {
    pub name: String,
    pub kind: ExerciseKind,
    pub notes: Option<String>,
    pub video_url: Option<String>,
}

impl Exercise {
    pub fn timed(name: &str, duration_secs: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: ExerciseKind::Timed { duration_secs },
            notes: None,
            video_url: None,
        }
    }

    pub fn rep_based(name: &str, sets: &str, reps: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ExerciseKind::RepBased {
                sets: sets.to_string(),
                reps: reps.to_string(),
            },
            notes: None,
            video_url: None,
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn with_video(mut self, url: &str) -> Self {
        self.video_url = Some(url.to_string());
        self
    }

    pub fn duration_secs(&self) -> Option<u32> {
        match self.kind {
            ExerciseKind::Timed { duration_secs } => Some(duration_secs),
            ExerciseKind::RepBased { .. } => None,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self.kind, ExerciseKind::Timed { .. })
    }
}

/// Wire shape produced by the plan generator: `durationSeconds` present means timed
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExercise {
    name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    sets: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    reps: Option<String>,
    #[serde(default, deserialize_with = "whole_number")]
    duration_seconds: Option<u32>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

impl From<RawExercise> for Exercise {
    fn from(raw: RawExercise) -> Self {
        let kind = match raw.duration_seconds {
            Some(duration_secs) => ExerciseKind::Timed { duration_secs },
            None => ExerciseKind::RepBased {
                sets: raw.sets.unwrap_or_default(),
                reps: raw.reps.unwrap_or_default(),
            },
        };

        Self {
            name: raw.name,
            kind,
            notes: raw.notes.filter(|n| !n.trim().is_empty()),
            video_url: raw.video_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Any JSON number, rounded to whole units. Zero and negatives count as absent.
fn whole_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .map(f64::round)
        .filter(|v| *v >= 1.0)
        .map(|v| v.min(u32::MAX as f64) as u32))
}

/// An ordered list of exercises played back by a session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDefinition {
    pub title: String,
    #[serde(default, deserialize_with = "whole_number")]
    pub duration_minutes: Option<u32>,
    pub exercises: Vec<Exercise>,
}

impl WorkoutDefinition {
    pub fn new(title: &str, exercises: Vec<Exercise>) -> Self {
        Self {
            title: title.to_string(),
            duration_minutes: None,
            exercises,
        }
    }

    /// Parse either a bare workout or a full health plan carrying a `workoutPlan`
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(plan) = value.get_mut("workoutPlan") {
            value = plan.take();
        }
        let workout: WorkoutDefinition = serde_json::from_value(value)?;
        workout.validated()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PlanError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load one of the workouts embedded in the binary
    pub fn bundled(name: &str) -> Result<Self, PlanError> {
        let file = PLAN_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| PlanError::UnknownBundled(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| PlanError::UnknownBundled(name.to_string()))?;
        Self::from_json(contents)
    }

    pub fn validated(self) -> Result<Self, PlanError> {
        if self.exercises.is_empty() {
            return Err(PlanError::Empty(self.title));
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// Names of the bundled workouts, sorted
pub fn bundled_names() -> Vec<String> {
    let mut names: Vec<String> = PLAN_DIR
        .files()
        .filter_map(|f| f.path().file_stem())
        .filter_map(|s| s.to_str())
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn duration_selects_timed_variant() {
        let json = r#"{"title":"t","exercises":[{"name":"Plank","durationSeconds":30,"notes":"hold"}]}"#;
        let w = WorkoutDefinition::from_json(json).unwrap();

        assert_eq!(w.exercises[0].kind, ExerciseKind::Timed { duration_secs: 30 });
        assert_eq!(w.exercises[0].notes.as_deref(), Some("hold"));
        assert!(w.exercises[0].is_timed());
    }

    #[test]
    fn missing_duration_selects_rep_based_variant() {
        let json = r#"{"title":"t","exercises":[{"name":"Push-ups","sets":"3","reps":"10-12","notes":""}]}"#;
        let w = WorkoutDefinition::from_json(json).unwrap();

        assert_eq!(
            w.exercises[0].kind,
            ExerciseKind::RepBased {
                sets: "3".into(),
                reps: "10-12".into()
            }
        );
        assert_eq!(w.exercises[0].notes, None);
        assert_eq!(w.exercises[0].duration_secs(), None);
    }

    #[test]
    fn zero_duration_is_rep_based() {
        let json = r#"{"title":"t","exercises":[{"name":"Squats","durationSeconds":0,"sets":"2","reps":"15"}]}"#;
        let w = WorkoutDefinition::from_json(json).unwrap();
        assert!(!w.exercises[0].is_timed());
    }

    #[test]
    fn fractional_durations_are_rounded() {
        let json = r#"{
            "title": "t",
            "durationMinutes": 7.5,
            "exercises": [
                {"name": "A", "durationSeconds": 30.0},
                {"name": "B", "durationSeconds": 44.6},
                {"name": "C", "durationSeconds": 0.2, "sets": "2", "reps": "8"},
                {"name": "D", "durationSeconds": -5}
            ]
        }"#;
        let w = WorkoutDefinition::from_json(json).unwrap();

        assert_eq!(w.duration_minutes, Some(8));
        assert_eq!(w.exercises[0].duration_secs(), Some(30));
        assert_eq!(w.exercises[1].duration_secs(), Some(45));
        assert!(!w.exercises[2].is_timed());
        assert!(!w.exercises[3].is_timed());
    }

    #[test]
    fn zero_plan_duration_is_absent() {
        let json = r#"{"title":"t","durationMinutes":0,"exercises":[{"name":"A","durationSeconds":10}]}"#;
        let w = WorkoutDefinition::from_json(json).unwrap();
        assert_eq!(w.duration_minutes, None);
    }

    #[test]
    fn numeric_sets_and_reps_are_accepted() {
        let json = r#"{"title":"t","exercises":[{"name":"Lunges","sets":3,"reps":12}]}"#;
        let w = WorkoutDefinition::from_json(json).unwrap();
        assert_eq!(
            w.exercises[0].kind,
            ExerciseKind::RepBased {
                sets: "3".into(),
                reps: "12".into()
            }
        );
    }

    #[test]
    fn health_plan_envelope_is_unwrapped() {
        let json = r#"{
            "dailyCalorieGoal": 2100,
            "workoutPlan": {
                "title": "Evening",
                "durationMinutes": 15,
                "exercises": [{"name":"Wall Sit","durationSeconds":45,"videoUrl":"https://example.com/v"}]
            }
        }"#;
        let w = WorkoutDefinition::from_json(json).unwrap();

        assert_eq!(w.title, "Evening");
        assert_eq!(w.duration_minutes, Some(15));
        assert_eq!(
            w.exercises[0].video_url.as_deref(),
            Some("https://example.com/v")
        );
    }

    #[test]
    fn empty_exercise_list_is_rejected() {
        let json = r#"{"title":"Nothing","exercises":[]}"#;
        assert_matches!(
            WorkoutDefinition::from_json(json),
            Err(PlanError::Empty(title)) if title == "Nothing"
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        assert_matches!(
            WorkoutDefinition::from_json("{not json"),
            Err(PlanError::Json(_))
        );
    }

    #[test]
    fn from_file_reads_plan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(
            &path,
            r#"{"title":"File","exercises":[{"name":"Jog","durationSeconds":60}]}"#,
        )
        .unwrap();

        let w = WorkoutDefinition::from_file(&path).unwrap();
        assert_eq!(w.title, "File");
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempdir().unwrap();
        assert_matches!(
            WorkoutDefinition::from_file(dir.path().join("nope.json")),
            Err(PlanError::Io(_))
        );
    }

    #[test]
    fn every_bundled_workout_loads() {
        let names = bundled_names();
        assert_eq!(names, vec!["core", "fullbody", "quickstart"]);
        for name in names {
            let w = WorkoutDefinition::bundled(&name).unwrap();
            assert!(!w.is_empty());
        }
    }

    #[test]
    fn unknown_bundled_workout() {
        assert_matches!(
            WorkoutDefinition::bundled("marathon"),
            Err(PlanError::UnknownBundled(_))
        );
    }
}
