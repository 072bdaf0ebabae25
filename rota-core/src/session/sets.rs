use log::{debug, warn};

use crate::errors::SessionError;
use crate::models::{CompleteSetInput, NewSetLog, SetLog};
use crate::session::WorkoutSessionManager;
use crate::store::{ProgramService, WorkoutStore};

impl<S: WorkoutStore, P: ProgramService> WorkoutSessionManager<S, P> {
    /// Record a performed set against the started workout.
    ///
    /// Completing a target set that already has a log replaces it: a new row
    /// is inserted, then the old one deleted. If either step fails the old
    /// log stays recorded and the new row is rolled back.
    pub async fn complete_set(&mut self, input: CompleteSetInput) -> Result<SetLog, SessionError> {
        self.clear_error();
        if self.user_id.is_none() {
            return self.fail(SessionError::NotAuthenticated);
        }

        let prepared = {
            let state = self.lock();
            match (state.workout_log_id, state.workout.as_ref()) {
                (Some(workout_log_id), Some(workout)) => {
                    if workout.target_set(input.exercise_set_id).is_none() {
                        Err(SessionError::UnknownTargetSet(input.exercise_set_id))
                    } else {
                        let previous = state
                            .completed_sets
                            .get(&input.exercise_set_id)
                            .map(|set| set.id);
                        Ok((workout_log_id, previous))
                    }
                }
                _ => Err(SessionError::NoActiveSession),
            }
        };
        let (workout_log_id, previous) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.fail(e),
        };

        let new_set = NewSetLog {
            workout_log_id,
            exercise_set_id: input.exercise_set_id,
            exercise_id: input.exercise_id,
            actual_reps: input.actual_reps,
            actual_weight: input.actual_weight,
            actual_duration_seconds: input.actual_duration_seconds,
            actual_distance_meters: input.actual_distance_meters,
            completed_at: self.clock.now(),
        };
        let id = match self.store.insert_set_log(&new_set).await {
            Ok(id) => id,
            Err(e) => return self.fail(e.context("insert set log").into()),
        };

        if let Some(previous_id) = previous {
            if let Err(e) = self.store.delete_set_log(previous_id).await {
                if let Err(rollback) = self.store.delete_set_log(id).await {
                    warn!("Could not roll back set log {}: {:#}", id, rollback);
                }
                return self.fail(e.context("replace set log").into());
            }
        }

        let set_log = new_set.into_set_log(id);
        debug!("Completed target set {} as {}", set_log.exercise_set_id, set_log);
        self.lock()
            .completed_sets
            .insert(set_log.exercise_set_id, set_log.clone());
        Ok(set_log)
    }

    /// Forget a recorded set. Returns whether anything was removed; a target
    /// set with nothing recorded is a successful no-op.
    pub async fn uncomplete_set(&mut self, exercise_set_id: i64) -> Result<bool, SessionError> {
        self.clear_error();
        let existing = self
            .lock()
            .completed_sets
            .get(&exercise_set_id)
            .map(|set| set.id);
        let Some(set_log_id) = existing else {
            return Ok(false);
        };

        if let Err(e) = self.store.delete_set_log(set_log_id).await {
            return self.fail(e.context("delete set log").into());
        }
        self.lock().completed_sets.remove(&exercise_set_id);
        debug!("Uncompleted target set {}", exercise_set_id);
        Ok(true)
    }
}
