//! Backend seams for the session manager.
//!
//! [`WorkoutStore`] covers the table-style operations a session issues and
//! [`ProgramService`] adopts template programs. [`SqliteStore`] implements both
//! over the local database; [`MemoryStore`] keeps everything in process and can
//! be told to fail specific calls.

mod memory;
mod sqlite;

pub use memory::{MemoryStore, StoreOp};
pub use sqlite::SqliteStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::future::Future;

use crate::models::{NewSetLog, NewWorkoutLog, ProgramStart, WorkoutTemplate};

pub trait WorkoutStore: Send + Sync + 'static {
    /// Workout with its exercises (by sort order) and target sets (by set number).
    fn fetch_workout(&self, workout_id: i64) -> impl Future<Output = Result<WorkoutTemplate>> + Send;

    /// Returns the generated workout-log id.
    fn insert_workout_log(&self, log: &NewWorkoutLog) -> impl Future<Output = Result<i64>> + Send;

    fn complete_workout_log(
        &self,
        workout_log_id: i64,
        completed_at: DateTime<Utc>,
        duration_seconds: i64,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_workout_log(&self, workout_log_id: i64) -> impl Future<Output = Result<()>> + Send;

    fn delete_set_logs_for_workout_log(
        &self,
        workout_log_id: i64,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Returns the generated set-log id.
    fn insert_set_log(&self, set: &NewSetLog) -> impl Future<Output = Result<i64>> + Send;

    fn delete_set_log(&self, set_log_id: i64) -> impl Future<Output = Result<()>> + Send;
}

pub trait ProgramService: Send + Sync + 'static {
    /// Adopt `template_program_id` for `user_id`, yielding the user's program id.
    fn start_program(
        &self,
        user_id: &str,
        template_program_id: i64,
    ) -> impl Future<Output = Result<ProgramStart>> + Send;
}
