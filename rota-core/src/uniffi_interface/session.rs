use log::{debug, info};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;

use crate::clock::SystemClock;
use crate::config::RotaConfig;
use crate::runtime::{global_runtime, run_on};
use crate::session::{SessionObserver, WorkoutSessionManager};
use crate::store::SqliteStore;
use crate::uniffi_interface::errors::RotaError;
use crate::uniffi_interface::objects::{
    CompleteSetInput, SessionPhase, SessionView, SetLog, WorkoutSummary, WorkoutTemplate,
};

type Manager = WorkoutSessionManager<SqliteStore, SqliteStore>;

/// Open (and migrate) the database at `db_path` and create a session for
/// `user_id`. Timer and rest settings come from the environment.
#[uniffi::export]
pub async fn open_workout_session(
    db_path: String,
    user_id: Option<String>,
) -> Result<WorkoutSessionHandle, RotaError> {
    let runtime = global_runtime().await?;
    let config = RotaConfig::from_env()?;

    let store = run_on(runtime, async move { SqliteStore::open(&db_path).await }).await??;
    let manager = WorkoutSessionManager::new(store.clone(), store, SystemClock, user_id)
        .with_config(&config);
    info!("Opened workout session for {:?}", manager.user_id());

    Ok(WorkoutSessionHandle {
        runtime,
        observer: manager.observer(),
        manager: Arc::new(Mutex::new(manager)),
    })
}

#[derive(uniffi::Object)]
pub struct WorkoutSessionHandle {
    runtime: &'static Runtime,
    manager: Arc<Mutex<Manager>>,
    observer: SessionObserver,
}

impl WorkoutSessionHandle {
    fn manager(&self) -> Arc<Mutex<Manager>> {
        Arc::clone(&self.manager)
    }
}

#[uniffi::export]
impl WorkoutSessionHandle {
    pub async fn load_workout(
        &self,
        workout_id: i64,
        program_id: Option<i64>,
        template_program_id: Option<i64>,
    ) -> Result<WorkoutTemplate, RotaError> {
        let manager = self.manager();
        let workout = run_on(self.runtime, async move {
            manager
                .lock()
                .await
                .load_workout(workout_id, program_id, template_program_id)
                .await
        })
        .await??;
        Ok(workout.into())
    }

    pub async fn begin_workout(&self) -> Result<i64, RotaError> {
        let manager = self.manager();
        let id = run_on(self.runtime, async move { manager.lock().await.begin_workout().await })
            .await??;
        Ok(id)
    }

    pub async fn complete_set(&self, input: CompleteSetInput) -> Result<SetLog, RotaError> {
        let manager = self.manager();
        let set = run_on(self.runtime, async move {
            manager.lock().await.complete_set(input.into()).await
        })
        .await??;
        Ok(set.into())
    }

    pub async fn uncomplete_set(&self, exercise_set_id: i64) -> Result<bool, RotaError> {
        let manager = self.manager();
        let removed = run_on(self.runtime, async move {
            manager.lock().await.uncomplete_set(exercise_set_id).await
        })
        .await??;
        Ok(removed)
    }

    /// Returns the new paused flag.
    pub async fn toggle_pause(&self) -> Result<bool, RotaError> {
        let manager = self.manager();
        let paused =
            run_on(self.runtime, async move { manager.lock().await.toggle_pause() }).await??;
        Ok(paused)
    }

    pub async fn start_rest_timer(&self, seconds: u32) -> Result<(), RotaError> {
        let manager = self.manager();
        run_on(self.runtime, async move {
            manager.lock().await.start_rest_timer(seconds);
        })
        .await?;
        Ok(())
    }

    pub async fn start_rest_for_set(&self, exercise_set_id: i64) -> Result<u32, RotaError> {
        let manager = self.manager();
        let seconds = run_on(self.runtime, async move {
            manager.lock().await.start_rest_for_set(exercise_set_id)
        })
        .await??;
        Ok(seconds)
    }

    pub async fn stop_rest_timer(&self) -> Result<(), RotaError> {
        let manager = self.manager();
        run_on(self.runtime, async move {
            manager.lock().await.stop_rest_timer();
        })
        .await?;
        Ok(())
    }

    pub async fn finish_workout(&self) -> Result<WorkoutSummary, RotaError> {
        let manager = self.manager();
        let summary = run_on(self.runtime, async move {
            manager.lock().await.finish_workout().await
        })
        .await??;
        Ok(summary.into())
    }

    pub async fn cancel_workout(&self) -> Result<(), RotaError> {
        let manager = self.manager();
        run_on(self.runtime, async move {
            manager.lock().await.cancel_workout().await;
        })
        .await?;
        Ok(())
    }

    pub async fn set_user(&self, user_id: Option<String>) -> Result<(), RotaError> {
        debug!("Switching session user");
        let manager = self.manager();
        run_on(self.runtime, async move {
            manager.lock().await.set_user(user_id);
        })
        .await?;
        Ok(())
    }

    // Reads go through the observer so they never wait on a backend call.

    pub fn view(&self) -> SessionView {
        self.observer.view().into()
    }

    pub fn phase(&self) -> SessionPhase {
        self.observer.phase().into()
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.observer.elapsed_seconds()
    }

    pub fn is_paused(&self) -> bool {
        self.observer.is_paused()
    }

    pub fn is_resting(&self) -> bool {
        self.observer.is_resting()
    }

    pub fn rest_seconds_remaining(&self) -> u32 {
        self.observer.rest_seconds_remaining()
    }

    pub fn error(&self) -> Option<String> {
        self.observer.error().map(|e| e.to_string())
    }
}
