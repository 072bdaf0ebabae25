use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{
    NewSetLog, NewWorkoutLog, ProgramStart, SetLog, WorkoutLog, WorkoutTemplate,
};
use crate::store::{ProgramService, WorkoutStore};

/// Operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FetchWorkout,
    InsertWorkoutLog,
    CompleteWorkoutLog,
    DeleteWorkoutLog,
    DeleteSetLogs,
    InsertSetLog,
    DeleteSetLog,
    StartProgram,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    workouts: HashMap<i64, WorkoutTemplate>,
    /// template program id -> adopted program id, per user
    adoptions: HashMap<(String, i64), i64>,
    unknown_templates: HashSet<i64>,
    workout_logs: BTreeMap<i64, WorkoutLog>,
    set_logs: BTreeMap<i64, SetLog>,
    failing: HashSet<StoreOp>,
    failing_once: HashSet<StoreOp>,
    calls: HashMap<StoreOp, usize>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn enter(&mut self, op: StoreOp) -> Result<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        if self.failing.contains(&op) || self.failing_once.remove(&op) {
            return Err(anyhow!("injected failure: {:?}", op));
        }
        Ok(())
    }
}

/// In-process store. Clones share the same data, so a test can keep one
/// handle for inspection while the session manager owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_workout(self, workout: WorkoutTemplate) -> Self {
        self.add_workout(workout);
        self
    }

    pub fn add_workout(&self, workout: WorkoutTemplate) {
        self.lock().workouts.insert(workout.id, workout);
    }

    /// Make `start_program` report `success: false` for this template.
    pub fn reject_template(&self, template_program_id: i64) {
        self.lock().unknown_templates.insert(template_program_id);
    }

    pub fn fail(&self, op: StoreOp) {
        self.lock().failing.insert(op);
    }

    /// Fail only the next call of `op`.
    pub fn fail_once(&self, op: StoreOp) {
        self.lock().failing_once.insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        let mut inner = self.lock();
        inner.failing.remove(&op);
        inner.failing_once.remove(&op);
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn workout_logs(&self) -> Vec<WorkoutLog> {
        self.lock().workout_logs.values().cloned().collect()
    }

    pub fn workout_log(&self, workout_log_id: i64) -> Option<WorkoutLog> {
        self.lock().workout_logs.get(&workout_log_id).cloned()
    }

    pub fn set_logs(&self) -> Vec<SetLog> {
        self.lock().set_logs.values().cloned().collect()
    }

    pub fn adopted_program(&self, user_id: &str, template_program_id: i64) -> Option<i64> {
        self.lock()
            .adoptions
            .get(&(user_id.to_string(), template_program_id))
            .copied()
    }
}

impl WorkoutStore for MemoryStore {
    async fn fetch_workout(&self, workout_id: i64) -> Result<WorkoutTemplate> {
        let mut inner = self.lock();
        inner.enter(StoreOp::FetchWorkout)?;
        inner
            .workouts
            .get(&workout_id)
            .cloned()
            .ok_or_else(|| anyhow!("workout {} not found", workout_id))
    }

    async fn insert_workout_log(&self, log: &NewWorkoutLog) -> Result<i64> {
        let mut inner = self.lock();
        inner.enter(StoreOp::InsertWorkoutLog)?;
        if !inner.workouts.contains_key(&log.workout_id) {
            return Err(anyhow!("workout {} not found", log.workout_id));
        }
        let id = inner.next_id();
        inner.workout_logs.insert(
            id,
            WorkoutLog {
                id,
                user_id: log.user_id.clone(),
                workout_id: log.workout_id,
                program_id: log.program_id,
                started_at: log.started_at,
                completed_at: None,
                duration_seconds: None,
            },
        );
        Ok(id)
    }

    async fn complete_workout_log(
        &self,
        workout_log_id: i64,
        completed_at: DateTime<Utc>,
        duration_seconds: i64,
    ) -> Result<()> {
        let mut inner = self.lock();
        inner.enter(StoreOp::CompleteWorkoutLog)?;
        let log = inner
            .workout_logs
            .get_mut(&workout_log_id)
            .ok_or_else(|| anyhow!("workout log {} not found", workout_log_id))?;
        log.completed_at = Some(completed_at);
        log.duration_seconds = Some(duration_seconds);
        Ok(())
    }

    async fn delete_workout_log(&self, workout_log_id: i64) -> Result<()> {
        let mut inner = self.lock();
        inner.enter(StoreOp::DeleteWorkoutLog)?;
        if inner
            .set_logs
            .values()
            .any(|s| s.workout_log_id == workout_log_id)
        {
            return Err(anyhow!(
                "workout log {} still has set logs",
                workout_log_id
            ));
        }
        inner
            .workout_logs
            .remove(&workout_log_id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("workout log {} not found", workout_log_id))
    }

    async fn delete_set_logs_for_workout_log(&self, workout_log_id: i64) -> Result<u64> {
        let mut inner = self.lock();
        inner.enter(StoreOp::DeleteSetLogs)?;
        let before = inner.set_logs.len();
        inner
            .set_logs
            .retain(|_, s| s.workout_log_id != workout_log_id);
        Ok((before - inner.set_logs.len()) as u64)
    }

    async fn insert_set_log(&self, set: &NewSetLog) -> Result<i64> {
        let mut inner = self.lock();
        inner.enter(StoreOp::InsertSetLog)?;
        if !inner.workout_logs.contains_key(&set.workout_log_id) {
            return Err(anyhow!("workout log {} not found", set.workout_log_id));
        }
        let id = inner.next_id();
        inner.set_logs.insert(id, set.clone().into_set_log(id));
        Ok(id)
    }

    async fn delete_set_log(&self, set_log_id: i64) -> Result<()> {
        let mut inner = self.lock();
        inner.enter(StoreOp::DeleteSetLog)?;
        inner
            .set_logs
            .remove(&set_log_id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("set log {} not found", set_log_id))
    }
}

impl ProgramService for MemoryStore {
    async fn start_program(&self, user_id: &str, template_program_id: i64) -> Result<ProgramStart> {
        let mut inner = self.lock();
        inner.enter(StoreOp::StartProgram)?;
        if inner.unknown_templates.contains(&template_program_id) {
            return Ok(ProgramStart {
                success: false,
                program_id: None,
            });
        }

        let key = (user_id.to_string(), template_program_id);
        let program_id = match inner.adoptions.get(&key) {
            Some(id) => *id,
            None => {
                let id = inner.next_id();
                inner.adoptions.insert(key, id);
                id
            }
        };
        Ok(ProgramStart {
            success: true,
            program_id: Some(program_id),
        })
    }
}
