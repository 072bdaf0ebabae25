//! Pause/resume accounting and the rest countdown.

use chrono::TimeDelta;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::SessionError;
use crate::models::RestTimer;
use crate::session::WorkoutSessionManager;
use crate::session::state::lock_state;
use crate::store::{ProgramService, WorkoutStore};
use crate::timer::RepeatingTimer;

/// The rest countdown always moves in whole seconds, whatever the elapsed
/// tick interval is configured to.
const REST_TICK: Duration = Duration::from_secs(1);

impl<S: WorkoutStore, P: ProgramService> WorkoutSessionManager<S, P> {
    /// Pause a running workout or resume a paused one. Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        self.clear_error();
        let now = self.clock.now();

        let paused = {
            let mut state = self.lock();
            if !state.is_started() {
                None
            } else if let Some(paused_at) = state.paused_at.take() {
                state.total_paused += (now - paused_at).max(TimeDelta::zero());
                state.refresh_elapsed(now);
                Some(false)
            } else {
                state.refresh_elapsed(now);
                state.paused_at = Some(now);
                Some(true)
            }
        };
        let Some(paused) = paused else {
            return self.fail(SessionError::NoActiveSession);
        };

        self.sync_elapsed_timer();
        debug!("Workout {}", if paused { "paused" } else { "resumed" });
        Ok(paused)
    }

    /// Recompute elapsed seconds now, exactly as a timer tick would.
    pub fn tick(&self) -> i64 {
        let now = self.clock.now();
        let mut state = self.lock();
        if state.should_tick() {
            state.refresh_elapsed(now);
        }
        state.elapsed_seconds
    }

    /// Start a rest countdown, replacing any countdown already running.
    pub fn start_rest_timer(&mut self, seconds: u32) {
        if let Some(timer) = self.rest_timer.take() {
            timer.cancel();
        }

        let generation = {
            let mut state = self.lock();
            state.rest_generation += 1;
            state.rest = RestTimer {
                remaining_seconds: seconds,
                active: seconds > 0,
            };
            state.rest_generation
        };
        if seconds == 0 {
            return;
        }

        let state = Arc::clone(self.observer().shared());
        self.rest_timer = Some(RepeatingTimer::start(
            "rest",
            REST_TICK,
            move || lock_state(&state).tick_rest(generation),
        ));
        debug!("Rest timer started for {}s", seconds);
    }

    /// Start a rest countdown sized by the target set's rest time, or the
    /// configured default when it has none. Returns the seconds used.
    pub fn start_rest_for_set(&mut self, exercise_set_id: i64) -> Result<u32, SessionError> {
        self.clear_error();
        let rest = {
            let state = self.lock();
            match state.workout.as_ref() {
                None => Err(SessionError::NoSessionLoaded),
                Some(workout) => workout
                    .target_set(exercise_set_id)
                    .map(|(_, set)| set.rest_seconds)
                    .ok_or(SessionError::UnknownTargetSet(exercise_set_id)),
            }
        };
        let seconds = match rest {
            Ok(Some(secs)) => u32::try_from(secs.max(0)).unwrap_or(u32::MAX),
            Ok(None) => self.default_rest_seconds,
            Err(e) => return self.fail(e),
        };

        self.start_rest_timer(seconds);
        Ok(seconds)
    }

    pub fn stop_rest_timer(&mut self) {
        if let Some(timer) = self.rest_timer.take() {
            timer.cancel();
        }
        let mut state = self.lock();
        state.rest_generation += 1;
        state.rest = RestTimer::default();
    }
}
