use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::clock::Clock;
use crate::config::{DEFAULT_REST_SECONDS, DEFAULT_TICK_MS, RotaConfig};
use crate::errors::SessionError;
use crate::models::{Progress, SessionPhase, SessionView, SetLog, WorkoutTemplate};
use crate::session::state::{SessionObserver, SessionState, lock_state};
use crate::store::{ProgramService, WorkoutStore};
use crate::timer::RepeatingTimer;

/// Owns the lifecycle of one workout attempt.
///
/// The manager moves through three phases: empty, loaded (a template is in
/// memory but nothing is persisted), and started (a workout log exists and the
/// elapsed timer runs). Operations that need the backend are `async`; the
/// pause and rest-timer controls are synchronous but, like [`tokio::spawn`],
/// must be called from within a tokio runtime.
pub struct WorkoutSessionManager<S, P> {
    pub(crate) store: S,
    pub(crate) programs: P,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) user_id: Option<String>,
    pub(crate) tick_interval: Duration,
    pub(crate) default_rest_seconds: u32,
    observer: SessionObserver,
    elapsed_timer: Option<RepeatingTimer>,
    pub(crate) rest_timer: Option<RepeatingTimer>,
}

impl<S: WorkoutStore, P: ProgramService> WorkoutSessionManager<S, P> {
    pub fn new(store: S, programs: P, clock: impl Clock, user_id: Option<String>) -> Self {
        Self {
            store,
            programs,
            clock: Arc::new(clock),
            user_id,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            default_rest_seconds: DEFAULT_REST_SECONDS,
            observer: SessionObserver::new(Arc::new(Mutex::new(SessionState::default()))),
            elapsed_timer: None,
            rest_timer: None,
        }
    }

    pub fn with_config(mut self, config: &RotaConfig) -> Self {
        self.tick_interval = config.tick_interval;
        self.default_rest_seconds = config.default_rest_seconds;
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Sign a user in or out. Does not touch the current session.
    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn observer(&self) -> SessionObserver {
        self.observer.clone()
    }

    pub fn view(&self) -> SessionView {
        self.observer.view()
    }

    pub fn phase(&self) -> SessionPhase {
        self.observer.phase()
    }

    pub fn is_workout_started(&self) -> bool {
        self.lock().is_started()
    }

    pub fn is_paused(&self) -> bool {
        self.observer.is_paused()
    }

    pub fn is_timer_running(&self) -> bool {
        self.lock().is_timer_running
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.observer.elapsed_seconds()
    }

    pub fn is_resting(&self) -> bool {
        self.observer.is_resting()
    }

    pub fn rest_seconds_remaining(&self) -> u32 {
        self.observer.rest_seconds_remaining()
    }

    /// Error left behind by the most recent failed operation.
    pub fn error(&self) -> Option<SessionError> {
        self.observer.error()
    }

    pub fn workout(&self) -> Option<WorkoutTemplate> {
        self.lock().workout.clone()
    }

    pub fn workout_log_id(&self) -> Option<i64> {
        self.lock().workout_log_id
    }

    pub fn program_id(&self) -> Option<i64> {
        self.lock().program_id
    }

    /// Completed sets ordered by completion time.
    pub fn completed_sets(&self) -> Vec<SetLog> {
        self.lock().sorted_set_logs()
    }

    pub fn completed_set(&self, exercise_set_id: i64) -> Option<SetLog> {
        self.lock().completed_sets.get(&exercise_set_id).cloned()
    }

    pub fn is_set_completed(&self, exercise_set_id: i64) -> bool {
        self.lock().completed_sets.contains_key(&exercise_set_id)
    }

    pub fn progress(&self) -> Progress {
        self.lock().progress()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.observer.lock()
    }

    pub(crate) fn clear_error(&self) {
        self.lock().error = None;
    }

    /// Record `err` as the session error and hand it back.
    pub(crate) fn fail<T>(&self, err: SessionError) -> Result<T, SessionError> {
        debug!("Session operation failed: {}", err);
        self.lock().error = Some(err.clone());
        Err(err)
    }

    /// Start or stop the elapsed timer so it runs exactly while the session
    /// is started, not paused, and the timer is switched on.
    pub(crate) fn sync_elapsed_timer(&mut self) {
        let should_tick = self.lock().should_tick();
        let running = self
            .elapsed_timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished());

        if should_tick && !running {
            let generation = {
                let mut state = self.lock();
                state.elapsed_generation += 1;
                state.elapsed_generation
            };
            let state = Arc::clone(self.observer.shared());
            let clock = Arc::clone(&self.clock);
            self.elapsed_timer = Some(RepeatingTimer::start(
                "elapsed",
                self.tick_interval,
                move || {
                    let now = clock.now();
                    lock_state(&state).tick_elapsed(generation, now)
                },
            ));
        } else if !should_tick {
            if let Some(timer) = self.elapsed_timer.take() {
                timer.cancel();
                self.lock().elapsed_generation += 1;
            }
        }
    }

    pub(crate) fn stop_timers(&mut self) {
        if let Some(timer) = self.elapsed_timer.take() {
            timer.cancel();
        }
        if let Some(timer) = self.rest_timer.take() {
            timer.cancel();
        }
        let mut state = self.lock();
        state.is_timer_running = false;
        state.rest = Default::default();
        state.elapsed_generation += 1;
        state.rest_generation += 1;
    }
}
