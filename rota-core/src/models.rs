//! Domain types shared by the session manager, the stores and the FFI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A planned unit of work inside a workout template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSet {
    pub id: i64,
    pub set_number: i64,
    pub target_reps: Option<i64>,
    pub target_weight: Option<f64>,
    pub target_duration_seconds: Option<i64>,
    pub target_distance_meters: Option<f64>,
    pub rest_seconds: Option<i64>,
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Set {}", self.set_number)?;
        write_measures(
            f,
            self.target_weight,
            self.target_reps,
            self.target_duration_seconds,
            self.target_distance_meters,
        )
    }
}

/// Only the measures that are present, so cardio sets never read as "0kg".
fn write_measures(
    f: &mut fmt::Formatter<'_>,
    weight: Option<f64>,
    reps: Option<i64>,
    duration_seconds: Option<i64>,
    distance_meters: Option<f64>,
) -> fmt::Result {
    if let Some(weight) = weight {
        write!(f, ": {:.1}kg", weight)?;
    }
    if let Some(reps) = reps {
        write!(f, " x {} reps", reps)?;
    }
    if let Some(secs) = duration_seconds {
        write!(f, " {}s", secs)?;
    }
    if let Some(meters) = distance_meters {
        write!(f, " {:.0}m", meters)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    /// Identifier of the exercise's slot inside the workout.
    pub id: i64,
    pub exercise_id: i64,
    pub name: String,
    pub is_cardio: bool,
    pub sort_order: i64,
    pub sets: Vec<TargetSet>,
}

/// A workout as planned: ordered exercises, each with ordered target sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: i64,
    pub name: String,
    pub program_id: Option<i64>,
    pub exercises: Vec<TemplateExercise>,
}

impl WorkoutTemplate {
    pub fn target_set(&self, exercise_set_id: i64) -> Option<(&TemplateExercise, &TargetSet)> {
        self.exercises.iter().find_map(|exercise| {
            exercise
                .sets
                .iter()
                .find(|set| set.id == exercise_set_id)
                .map(|set| (exercise, set))
        })
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// Recorded performance against one target set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    pub id: i64,
    pub workout_log_id: i64,
    pub exercise_set_id: i64,
    pub exercise_id: i64,
    pub actual_reps: Option<i64>,
    pub actual_weight: Option<f64>,
    pub actual_duration_seconds: Option<i64>,
    pub actual_distance_meters: Option<f64>,
    pub completed_at: DateTime<Utc>,
}

impl fmt::Display for SetLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exercise #{}", self.exercise_id)?;
        write_measures(
            f,
            self.actual_weight,
            self.actual_reps,
            self.actual_duration_seconds,
            self.actual_distance_meters,
        )
    }
}

/// What the caller reports when a set is done.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteSetInput {
    pub exercise_set_id: i64,
    pub exercise_id: i64,
    pub actual_reps: Option<i64>,
    pub actual_weight: Option<f64>,
    pub actual_duration_seconds: Option<i64>,
    pub actual_distance_meters: Option<f64>,
}

impl CompleteSetInput {
    /// Input that records the target values as performed.
    pub fn from_target(exercise_id: i64, set: &TargetSet) -> Self {
        Self {
            exercise_set_id: set.id,
            exercise_id,
            actual_reps: set.target_reps,
            actual_weight: set.target_weight,
            actual_duration_seconds: set.target_duration_seconds,
            actual_distance_meters: set.target_distance_meters,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutLog {
    pub user_id: String,
    pub workout_id: i64,
    pub program_id: Option<i64>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSetLog {
    pub workout_log_id: i64,
    pub exercise_set_id: i64,
    pub exercise_id: i64,
    pub actual_reps: Option<i64>,
    pub actual_weight: Option<f64>,
    pub actual_duration_seconds: Option<i64>,
    pub actual_distance_meters: Option<f64>,
    pub completed_at: DateTime<Utc>,
}

impl NewSetLog {
    pub fn into_set_log(self, id: i64) -> SetLog {
        SetLog {
            id,
            workout_log_id: self.workout_log_id,
            exercise_set_id: self.exercise_set_id,
            exercise_id: self.exercise_id,
            actual_reps: self.actual_reps,
            actual_weight: self.actual_weight,
            actual_duration_seconds: self.actual_duration_seconds,
            actual_distance_meters: self.actual_distance_meters,
            completed_at: self.completed_at,
        }
    }
}

/// Persisted record of one attempt at a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: i64,
    pub user_id: String,
    pub workout_id: i64,
    pub program_id: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
}

/// Result of adopting a template program for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramStart {
    pub success: bool,
    pub program_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestTimer {
    pub remaining_seconds: u32,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Empty,
    Loaded,
    Started,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed_sets: usize,
    pub total_sets: usize,
}

/// Snapshot handed back by a successful finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub workout_log_id: i64,
    pub workout: WorkoutTemplate,
    pub program_id: Option<i64>,
    pub set_logs: Vec<SetLog>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl WorkoutSummary {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read-only copy of the in-memory session, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub workout: Option<WorkoutTemplate>,
    pub workout_log_id: Option<i64>,
    pub completed_sets: Vec<SetLog>,
    pub elapsed_seconds: i64,
    pub is_paused: bool,
    pub is_timer_running: bool,
    pub rest: RestTimer,
    pub error: Option<String>,
    pub progress: Progress,
}
