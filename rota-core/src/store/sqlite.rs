use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::db::operations;
use crate::models::{NewSetLog, NewWorkoutLog, ProgramStart, WorkoutTemplate};
use crate::store::{ProgramService, WorkoutStore};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Stamp adopted programs with `clock` instead of the system time.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub async fn open(db_path: &str) -> Result<Self> {
        Ok(Self::new(crate::db::connect(db_path).await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl WorkoutStore for SqliteStore {
    async fn fetch_workout(&self, workout_id: i64) -> Result<WorkoutTemplate> {
        operations::get_workout_template(&self.pool, workout_id).await
    }

    async fn insert_workout_log(&self, log: &NewWorkoutLog) -> Result<i64> {
        operations::insert_workout_log(&self.pool, log).await
    }

    async fn complete_workout_log(
        &self,
        workout_log_id: i64,
        completed_at: DateTime<Utc>,
        duration_seconds: i64,
    ) -> Result<()> {
        operations::complete_workout_log(&self.pool, workout_log_id, completed_at, duration_seconds)
            .await
    }

    async fn delete_workout_log(&self, workout_log_id: i64) -> Result<()> {
        let deleted = operations::delete_workout_log(&self.pool, workout_log_id).await?;
        if deleted == 0 {
            return Err(anyhow!("workout log {} not found", workout_log_id));
        }
        Ok(())
    }

    async fn delete_set_logs_for_workout_log(&self, workout_log_id: i64) -> Result<u64> {
        operations::delete_set_logs_for_workout_log(&self.pool, workout_log_id).await
    }

    async fn insert_set_log(&self, set: &NewSetLog) -> Result<i64> {
        operations::insert_set_log(&self.pool, set).await
    }

    async fn delete_set_log(&self, set_log_id: i64) -> Result<()> {
        let deleted = operations::delete_set_log(&self.pool, set_log_id).await?;
        if deleted == 0 {
            return Err(anyhow!("set log {} not found", set_log_id));
        }
        Ok(())
    }
}

impl ProgramService for SqliteStore {
    async fn start_program(&self, user_id: &str, template_program_id: i64) -> Result<ProgramStart> {
        if let Some(existing) =
            operations::find_adopted_program(&self.pool, user_id, template_program_id).await?
        {
            debug!(
                "Template program {} already adopted by {} as {}",
                template_program_id, user_id, existing.id
            );
            return Ok(ProgramStart {
                success: true,
                program_id: Some(existing.id),
            });
        }

        let program_id = operations::adopt_template_program(
            &self.pool,
            user_id,
            template_program_id,
            self.clock.now(),
        )
        .await?;
        Ok(ProgramStart {
            success: program_id.is_some(),
            program_id,
        })
    }
}
