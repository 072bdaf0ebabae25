use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::{SetLog, TargetSet, TemplateExercise, WorkoutLog, WorkoutTemplate};

#[derive(Debug, Clone, FromRow)]
pub struct WorkoutRow {
    pub id: i64,
    pub program_id: Option<i64>,
    pub name: String,
}

/// One row of the workout/exercise/set join. Set columns are null for an
/// exercise slot that has no target sets yet.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateSetRow {
    pub workout_exercise_id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub is_cardio: bool,
    pub sort_order: i64,
    pub set_id: Option<i64>,
    pub set_number: Option<i64>,
    pub target_reps: Option<i64>,
    pub target_weight: Option<f64>,
    pub target_duration_seconds: Option<i64>,
    pub target_distance_meters: Option<f64>,
    pub rest_seconds: Option<i64>,
}

/// Group join rows (already ordered by sort order, then set number) into a template.
pub fn assemble_template(workout: WorkoutRow, rows: Vec<TemplateSetRow>) -> WorkoutTemplate {
    let mut exercises: Vec<TemplateExercise> = Vec::new();

    for row in rows {
        let needs_new = exercises
            .last()
            .is_none_or(|last| last.id != row.workout_exercise_id);
        if needs_new {
            exercises.push(TemplateExercise {
                id: row.workout_exercise_id,
                exercise_id: row.exercise_id,
                name: row.exercise_name.clone(),
                is_cardio: row.is_cardio,
                sort_order: row.sort_order,
                sets: Vec::new(),
            });
        }

        if let (Some(set_id), Some(exercise)) = (row.set_id, exercises.last_mut()) {
            exercise.sets.push(TargetSet {
                id: set_id,
                set_number: row.set_number.unwrap_or(0),
                target_reps: row.target_reps,
                target_weight: row.target_weight,
                target_duration_seconds: row.target_duration_seconds,
                target_distance_meters: row.target_distance_meters,
                rest_seconds: row.rest_seconds,
            });
        }
    }

    WorkoutTemplate {
        id: workout.id,
        name: workout.name,
        program_id: workout.program_id,
        exercises,
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkoutLogRow {
    pub id: i64,
    pub user_id: String,
    pub workout_id: i64,
    pub program_id: Option<i64>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
}

impl From<WorkoutLogRow> for WorkoutLog {
    fn from(row: WorkoutLogRow) -> Self {
        WorkoutLog {
            id: row.id,
            user_id: row.user_id,
            workout_id: row.workout_id,
            program_id: row.program_id,
            started_at: row.started_at,
            completed_at: row.completed_at,
            duration_seconds: row.duration_seconds,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SetLogRow {
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

impl From<SetLogRow> for SetLog {
    fn from(row: SetLogRow) -> Self {
        SetLog {
            id: row.id,
            workout_log_id: row.workout_log_id,
            exercise_set_id: row.exercise_set_id,
            exercise_id: row.exercise_id,
            actual_reps: row.actual_reps,
            actual_weight: row.actual_weight,
            actual_duration_seconds: row.actual_duration_seconds,
            actual_distance_meters: row.actual_distance_meters,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProgramRow {
    pub id: i64,
    pub user_id: Option<String>,
    pub template_id: Option<i64>,
    pub name: String,
    pub is_template: bool,
    pub is_active: bool,
}

// Insert-side shapes used by the seed and by tests.

#[derive(Debug, Clone)]
pub struct NewTargetSet {
    pub target_reps: Option<i64>,
    pub target_weight: Option<f64>,
    pub target_duration_seconds: Option<i64>,
    pub target_distance_meters: Option<f64>,
    pub rest_seconds: Option<i64>,
}

impl NewTargetSet {
    pub fn strength(reps: i64, weight: f64, rest_seconds: i64) -> Self {
        Self {
            target_reps: Some(reps),
            target_weight: Some(weight),
            target_duration_seconds: None,
            target_distance_meters: None,
            rest_seconds: Some(rest_seconds),
        }
    }

    pub fn cardio(duration_seconds: i64, distance_meters: Option<f64>) -> Self {
        Self {
            target_reps: None,
            target_weight: None,
            target_duration_seconds: Some(duration_seconds),
            target_distance_meters: distance_meters,
            rest_seconds: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTemplateExercise {
    pub name: String,
    pub is_cardio: bool,
    pub sets: Vec<NewTargetSet>,
}

#[derive(Debug, Clone)]
pub struct NewWorkoutTemplate {
    pub name: String,
    pub program_id: Option<i64>,
    pub exercises: Vec<NewTemplateExercise>,
}
