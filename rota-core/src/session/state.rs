use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::SessionError;
use crate::models::{
    Progress, RestTimer, SessionPhase, SessionView, SetLog, WorkoutSummary, WorkoutTemplate,
};

/// Everything a session keeps in memory. Shared between the manager and its
/// two timer tasks; the lock is never held across an await.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub workout: Option<WorkoutTemplate>,
    pub program_id: Option<i64>,
    pub template_program_id: Option<i64>,
    pub workout_log_id: Option<i64>,
    /// Keyed by target-set id.
    pub completed_sets: HashMap<i64, SetLog>,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub total_paused: TimeDelta,
    pub elapsed_seconds: i64,
    pub is_timer_running: bool,
    pub rest: RestTimer,
    pub error: Option<SessionError>,
    // Bumped whenever a timer is replaced or stopped, so a tick that raced
    // with the cancellation can tell it is stale.
    pub elapsed_generation: u64,
    pub rest_generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            workout: None,
            program_id: None,
            template_program_id: None,
            workout_log_id: None,
            completed_sets: HashMap::new(),
            started_at: None,
            paused_at: None,
            total_paused: TimeDelta::zero(),
            elapsed_seconds: 0,
            is_timer_running: false,
            rest: RestTimer::default(),
            error: None,
            elapsed_generation: 0,
            rest_generation: 0,
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match (&self.workout, self.workout_log_id) {
            (None, _) => SessionPhase::Empty,
            (Some(_), None) => SessionPhase::Loaded,
            (Some(_), Some(_)) => SessionPhase::Started,
        }
    }

    pub fn is_started(&self) -> bool {
        self.workout_log_id.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn should_tick(&self) -> bool {
        self.is_started() && !self.is_paused() && self.is_timer_running
    }

    /// Time spent working so far: wall time since start minus every pause,
    /// including one still in progress.
    pub fn active_duration(&self, now: DateTime<Utc>) -> TimeDelta {
        let Some(started_at) = self.started_at else {
            return TimeDelta::zero();
        };
        let mut paused = self.total_paused;
        if let Some(paused_at) = self.paused_at {
            paused += (now - paused_at).max(TimeDelta::zero());
        }
        (now - started_at - paused).max(TimeDelta::zero())
    }

    pub fn refresh_elapsed(&mut self, now: DateTime<Utc>) -> i64 {
        if self.is_started() {
            self.elapsed_seconds = self.active_duration(now).num_seconds();
        }
        self.elapsed_seconds
    }

    pub fn tick_elapsed(&mut self, generation: u64, now: DateTime<Utc>) -> ControlFlow<()> {
        if generation != self.elapsed_generation || !self.should_tick() {
            return ControlFlow::Break(());
        }
        self.refresh_elapsed(now);
        ControlFlow::Continue(())
    }

    pub fn tick_rest(&mut self, generation: u64) -> ControlFlow<()> {
        if generation != self.rest_generation || !self.rest.active {
            return ControlFlow::Break(());
        }
        self.rest.remaining_seconds = self.rest.remaining_seconds.saturating_sub(1);
        if self.rest.remaining_seconds == 0 {
            self.rest.active = false;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed_sets: self.completed_sets.len(),
            total_sets: self.workout.as_ref().map_or(0, WorkoutTemplate::total_sets),
        }
    }

    pub fn sorted_set_logs(&self) -> Vec<SetLog> {
        let mut sets: Vec<SetLog> = self.completed_sets.values().cloned().collect();
        sets.sort_by(|a, b| a.completed_at.cmp(&b.completed_at).then(a.id.cmp(&b.id)));
        sets
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase(),
            workout: self.workout.clone(),
            workout_log_id: self.workout_log_id,
            completed_sets: self.sorted_set_logs(),
            elapsed_seconds: self.elapsed_seconds,
            is_paused: self.is_paused(),
            is_timer_running: self.is_timer_running,
            rest: self.rest,
            error: self.error.as_ref().map(ToString::to_string),
            progress: self.progress(),
        }
    }

    /// Snapshot for a finished session. `None` unless started.
    pub fn summary(&self, completed_at: DateTime<Utc>, duration_seconds: i64) -> Option<WorkoutSummary> {
        Some(WorkoutSummary {
            workout_log_id: self.workout_log_id?,
            workout: self.workout.clone()?,
            program_id: self.program_id,
            set_logs: self.sorted_set_logs(),
            started_at: self.started_at?,
            completed_at,
            duration_seconds,
        })
    }

    /// Back to the empty phase. Generations keep counting so stale ticks stay stale.
    pub fn reset(&mut self) {
        *self = Self {
            elapsed_generation: self.elapsed_generation + 1,
            rest_generation: self.rest_generation + 1,
            ..Self::default()
        };
    }
}

pub(crate) fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read-only handle on a session's in-memory state.
///
/// Clones are cheap and can live on a UI thread while the manager itself is
/// busy awaiting the backend.
#[derive(Clone)]
pub struct SessionObserver {
    state: Arc<Mutex<SessionState>>,
}

impl SessionObserver {
    pub(crate) fn new(state: Arc<Mutex<SessionState>>) -> Self {
        Self { state }
    }

    pub(crate) fn shared(&self) -> &Arc<Mutex<SessionState>> {
        &self.state
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    pub fn view(&self) -> SessionView {
        self.lock().view()
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.lock().elapsed_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.lock().is_paused()
    }

    pub fn is_resting(&self) -> bool {
        self.lock().rest.active
    }

    pub fn rest_seconds_remaining(&self) -> u32 {
        self.lock().rest.remaining_seconds
    }

    pub fn error(&self) -> Option<SessionError> {
        self.lock().error.clone()
    }
}
