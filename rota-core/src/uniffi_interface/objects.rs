//! Foreign-facing mirrors of the domain types. Timestamps cross the boundary
//! as RFC 3339 strings.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models;

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct TargetSet {
    pub id: i64,
    pub set_number: i64,
    pub target_reps: Option<i64>,
    pub target_weight: Option<f64>,
    pub target_duration_seconds: Option<i64>,
    pub target_distance_meters: Option<f64>,
    pub rest_seconds: Option<i64>,
}

impl From<models::TargetSet> for TargetSet {
    fn from(s: models::TargetSet) -> Self {
        TargetSet {
            id: s.id,
            set_number: s.set_number,
            target_reps: s.target_reps,
            target_weight: s.target_weight,
            target_duration_seconds: s.target_duration_seconds,
            target_distance_meters: s.target_distance_meters,
            rest_seconds: s.rest_seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct TemplateExercise {
    pub id: i64,
    pub exercise_id: i64,
    pub name: String,
    pub is_cardio: bool,
    pub sort_order: i64,
    pub sets: Vec<TargetSet>,
}

impl From<models::TemplateExercise> for TemplateExercise {
    fn from(e: models::TemplateExercise) -> Self {
        TemplateExercise {
            id: e.id,
            exercise_id: e.exercise_id,
            name: e.name,
            is_cardio: e.is_cardio,
            sort_order: e.sort_order,
            sets: e.sets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct WorkoutTemplate {
    pub id: i64,
    pub name: String,
    pub program_id: Option<i64>,
    pub exercises: Vec<TemplateExercise>,
}

impl From<models::WorkoutTemplate> for WorkoutTemplate {
    fn from(w: models::WorkoutTemplate) -> Self {
        WorkoutTemplate {
            id: w.id,
            name: w.name,
            program_id: w.program_id,
            exercises: w.exercises.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct SetLog {
    pub id: i64,
    pub workout_log_id: i64,
    pub exercise_set_id: i64,
    pub exercise_id: i64,
    pub actual_reps: Option<i64>,
    pub actual_weight: Option<f64>,
    pub actual_duration_seconds: Option<i64>,
    pub actual_distance_meters: Option<f64>,
    pub completed_at: String,
}

impl From<models::SetLog> for SetLog {
    fn from(s: models::SetLog) -> Self {
        SetLog {
            id: s.id,
            workout_log_id: s.workout_log_id,
            exercise_set_id: s.exercise_set_id,
            exercise_id: s.exercise_id,
            actual_reps: s.actual_reps,
            actual_weight: s.actual_weight,
            actual_duration_seconds: s.actual_duration_seconds,
            actual_distance_meters: s.actual_distance_meters,
            completed_at: timestamp(s.completed_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct CompleteSetInput {
    pub exercise_set_id: i64,
    pub exercise_id: i64,
    pub actual_reps: Option<i64>,
    pub actual_weight: Option<f64>,
    pub actual_duration_seconds: Option<i64>,
    pub actual_distance_meters: Option<f64>,
}

impl From<CompleteSetInput> for models::CompleteSetInput {
    fn from(i: CompleteSetInput) -> Self {
        models::CompleteSetInput {
            exercise_set_id: i.exercise_set_id,
            exercise_id: i.exercise_id,
            actual_reps: i.actual_reps,
            actual_weight: i.actual_weight,
            actual_duration_seconds: i.actual_duration_seconds,
            actual_distance_meters: i.actual_distance_meters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SessionPhase {
    Empty,
    Loaded,
    Started,
}

impl From<models::SessionPhase> for SessionPhase {
    fn from(p: models::SessionPhase) -> Self {
        match p {
            models::SessionPhase::Empty => SessionPhase::Empty,
            models::SessionPhase::Loaded => SessionPhase::Loaded,
            models::SessionPhase::Started => SessionPhase::Started,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct WorkoutSummary {
    pub workout_log_id: i64,
    pub workout: WorkoutTemplate,
    pub program_id: Option<i64>,
    pub set_logs: Vec<SetLog>,
    pub started_at: String,
    pub completed_at: String,
    pub duration_seconds: i64,
}

impl From<models::WorkoutSummary> for WorkoutSummary {
    fn from(s: models::WorkoutSummary) -> Self {
        WorkoutSummary {
            workout_log_id: s.workout_log_id,
            workout: s.workout.into(),
            program_id: s.program_id,
            set_logs: s.set_logs.into_iter().map(Into::into).collect(),
            started_at: timestamp(s.started_at),
            completed_at: timestamp(s.completed_at),
            duration_seconds: s.duration_seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub workout: Option<WorkoutTemplate>,
    pub workout_log_id: Option<i64>,
    pub completed_sets: Vec<SetLog>,
    pub elapsed_seconds: i64,
    pub is_paused: bool,
    pub is_timer_running: bool,
    pub rest_seconds_remaining: u32,
    pub is_resting: bool,
    pub error: Option<String>,
    pub completed_set_count: u64,
    pub total_set_count: u64,
}

impl From<models::SessionView> for SessionView {
    fn from(v: models::SessionView) -> Self {
        SessionView {
            phase: v.phase.into(),
            workout: v.workout.map(Into::into),
            workout_log_id: v.workout_log_id,
            completed_sets: v.completed_sets.into_iter().map(Into::into).collect(),
            elapsed_seconds: v.elapsed_seconds,
            is_paused: v.is_paused,
            is_timer_running: v.is_timer_running,
            rest_seconds_remaining: v.rest.remaining_seconds,
            is_resting: v.rest.active,
            error: v.error,
            completed_set_count: v.progress.completed_sets as u64,
            total_set_count: v.progress.total_sets as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_log_timestamps_are_rfc3339() {
        let completed_at = DateTime::from_timestamp(1_736_150_400, 0).unwrap();
        let log = SetLog::from(models::SetLog {
            id: 1,
            workout_log_id: 2,
            exercise_set_id: 3,
            exercise_id: 4,
            actual_reps: Some(5),
            actual_weight: Some(100.0),
            actual_duration_seconds: None,
            actual_distance_meters: None,
            completed_at,
        });
        assert_eq!(log.completed_at, "2025-01-06T08:00:00Z");
    }
}
