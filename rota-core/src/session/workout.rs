//! Workout lifecycle: load, begin, finish, cancel.

use chrono::TimeDelta;
use log::{debug, info, warn};

use crate::errors::SessionError;
use crate::models::{NewWorkoutLog, WorkoutSummary, WorkoutTemplate};
use crate::session::WorkoutSessionManager;
use crate::store::{ProgramService, WorkoutStore};

impl<S: WorkoutStore, P: ProgramService> WorkoutSessionManager<S, P> {
    /// Fetch a workout template and make it the session's preview.
    ///
    /// Nothing is persisted. On success every piece of session-local state
    /// (completed sets, timers, pause accounting) starts over; on failure the
    /// previous state is left as it was.
    pub async fn load_workout(
        &mut self,
        workout_id: i64,
        program_id: Option<i64>,
        template_program_id: Option<i64>,
    ) -> Result<WorkoutTemplate, SessionError> {
        self.clear_error();
        if self.user_id.is_none() {
            return self.fail(SessionError::NotAuthenticated);
        }
        if self.lock().is_started() {
            return self.fail(SessionError::AlreadyStarted);
        }

        let workout = match self.store.fetch_workout(workout_id).await {
            Ok(workout) => workout,
            Err(e) => return self.fail(e.context(format!("load workout {}", workout_id)).into()),
        };

        self.stop_timers();
        {
            let mut state = self.lock();
            state.reset();
            state.workout = Some(workout.clone());
            state.program_id = program_id;
            state.template_program_id = template_program_id;
        }

        debug!(
            "Loaded workout {} ({} exercises, {} sets)",
            workout.id,
            workout.exercises.len(),
            workout.total_sets()
        );
        Ok(workout)
    }

    /// Persist a workout log for the loaded template and start the clock.
    ///
    /// When the template belongs to a program the user has not adopted yet,
    /// the program is adopted first; if that fails nothing is persisted.
    /// Returns the new workout-log id.
    pub async fn begin_workout(&mut self) -> Result<i64, SessionError> {
        self.clear_error();
        let Some(user_id) = self.user_id.clone() else {
            return self.fail(SessionError::NotAuthenticated);
        };

        let prepared = {
            let state = self.lock();
            if state.is_started() {
                Err(SessionError::AlreadyStarted)
            } else {
                state
                    .workout
                    .as_ref()
                    .map(|w| (w.id, state.program_id, state.template_program_id))
                    .ok_or(SessionError::NoSessionLoaded)
            }
        };
        let (workout_id, program_id, template_program_id) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.fail(e),
        };

        let program_id = match (program_id, template_program_id) {
            (None, Some(template_id)) => {
                match self.programs.start_program(&user_id, template_id).await {
                    Ok(start) if start.success && start.program_id.is_some() => {
                        info!(
                            "Adopted template program {} as program {:?}",
                            template_id, start.program_id
                        );
                        self.lock().program_id = start.program_id;
                        start.program_id
                    }
                    Ok(_) => {
                        return self.fail(SessionError::ProgramStart(format!(
                            "template program {} could not be adopted",
                            template_id
                        )));
                    }
                    Err(e) => return self.fail(SessionError::ProgramStart(format!("{:#}", e))),
                }
            }
            (program_id, _) => program_id,
        };

        let started_at = self.clock.now();
        let log = NewWorkoutLog {
            user_id,
            workout_id,
            program_id,
            started_at,
        };
        let workout_log_id = match self.store.insert_workout_log(&log).await {
            Ok(id) => id,
            Err(e) => return self.fail(e.context("create workout log").into()),
        };

        {
            let mut state = self.lock();
            state.workout_log_id = Some(workout_log_id);
            state.started_at = Some(started_at);
            state.paused_at = None;
            state.total_paused = TimeDelta::zero();
            state.elapsed_seconds = 0;
            state.is_timer_running = true;
        }
        self.sync_elapsed_timer();

        info!(
            "Workout {} started as log {} at {}",
            workout_id, workout_log_id, started_at
        );
        Ok(workout_log_id)
    }

    /// Persist completion and hand back a snapshot of the session.
    ///
    /// The duration excludes paused time. If the backend rejects the update
    /// the session stays exactly as it was, timers included, so the caller
    /// can retry.
    pub async fn finish_workout(&mut self) -> Result<WorkoutSummary, SessionError> {
        self.clear_error();
        let completed_at = self.clock.now();

        let prepared = {
            let state = self.lock();
            match (state.workout_log_id, state.started_at) {
                (Some(id), Some(_)) => Some((id, state.active_duration(completed_at))),
                _ => None,
            }
        };
        let Some((workout_log_id, duration)) = prepared else {
            return self.fail(SessionError::NoActiveSession);
        };
        let duration_seconds = duration.num_seconds();

        if let Err(e) = self
            .store
            .complete_workout_log(workout_log_id, completed_at, duration_seconds)
            .await
        {
            return self.fail(e.context("complete workout log").into());
        }

        self.stop_timers();
        let summary = {
            let mut state = self.lock();
            let summary = state.summary(completed_at, duration_seconds);
            state.reset();
            summary
        };

        info!(
            "Workout log {} finished after {}s",
            workout_log_id, duration_seconds
        );
        match summary {
            Some(summary) => Ok(summary),
            None => self.fail(SessionError::NoActiveSession),
        }
    }

    /// Abandon the session. Always ends empty.
    ///
    /// A persisted attempt is cleaned up best-effort (set logs, then the log
    /// itself); cleanup failures are logged and otherwise ignored.
    pub async fn cancel_workout(&mut self) {
        self.stop_timers();
        let workout_log_id = self.lock().workout_log_id;

        if let Some(id) = workout_log_id {
            if let Err(e) = self.store.delete_set_logs_for_workout_log(id).await {
                warn!("Failed to delete set logs for cancelled workout log {}: {:#}", id, e);
            }
            if let Err(e) = self.store.delete_workout_log(id).await {
                warn!("Failed to delete cancelled workout log {}: {:#}", id, e);
            }
            info!("Workout log {} cancelled", id);
        }

        self.lock().reset();
    }
}
