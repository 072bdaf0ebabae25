use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

use crate::clock::ManualClock;
use crate::config::RotaConfig;
use crate::errors::SessionError;
use crate::models::{CompleteSetInput, SessionPhase, TargetSet, TemplateExercise, WorkoutTemplate};
use crate::session::WorkoutSessionManager;
use crate::store::{MemoryStore, StoreOp};

const WORKOUT_ID: i64 = 1;
const USER: &str = "user-1";

type Manager = WorkoutSessionManager<MemoryStore, MemoryStore>;

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 7, 30, 0).unwrap()
}

/// Three exercises with three target sets each. Target-set ids run 1..=9,
/// exercise ids are 100, 101, 102.
fn three_by_three() -> WorkoutTemplate {
    let names = ["Barbell Back Squat", "Bench Press", "Barbell Row"];
    WorkoutTemplate {
        id: WORKOUT_ID,
        name: "Full Body A".into(),
        program_id: None,
        exercises: names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let i = i as i64;
                TemplateExercise {
                    id: 10 + i,
                    exercise_id: 100 + i,
                    name: name.to_string(),
                    is_cardio: false,
                    sort_order: i,
                    sets: (1..=3)
                        .map(|n| TargetSet {
                            id: i * 3 + n,
                            set_number: n,
                            target_reps: Some(8),
                            target_weight: Some(80.0),
                            target_duration_seconds: None,
                            target_distance_meters: None,
                            rest_seconds: if i == 2 { None } else { Some(120) },
                        })
                        .collect(),
                }
            })
            .collect(),
    }
}

fn harness() -> (Manager, MemoryStore, ManualClock) {
    let store = MemoryStore::new().with_workout(three_by_three());
    let clock = ManualClock::new(start_time());
    let manager = WorkoutSessionManager::new(
        store.clone(),
        store.clone(),
        clock.clone(),
        Some(USER.to_string()),
    );
    (manager, store, clock)
}

async fn started() -> (Manager, MemoryStore, ManualClock) {
    let (mut manager, store, clock) = harness();
    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();
    manager.begin_workout().await.unwrap();
    (manager, store, clock)
}

fn set_input(exercise_set_id: i64, reps: i64, weight: f64) -> CompleteSetInput {
    CompleteSetInput {
        exercise_set_id,
        exercise_id: 100 + (exercise_set_id - 1) / 3,
        actual_reps: Some(reps),
        actual_weight: Some(weight),
        ..Default::default()
    }
}

// Loading

#[tokio::test]
async fn load_requires_a_user() {
    let (mut manager, store, _) = harness();
    manager.set_user(None);

    let err = manager.load_workout(WORKOUT_ID, None, None).await.unwrap_err();
    assert_eq!(err, SessionError::NotAuthenticated);
    assert_eq!(manager.error(), Some(SessionError::NotAuthenticated));
    assert_eq!(manager.phase(), SessionPhase::Empty);
    assert_eq!(store.calls(StoreOp::FetchWorkout), 0);
}

#[tokio::test]
async fn load_is_a_preview_only() {
    let (mut manager, store, _) = harness();
    let workout = manager.load_workout(WORKOUT_ID, None, None).await.unwrap();

    assert_eq!(workout.total_sets(), 9);
    assert_eq!(manager.phase(), SessionPhase::Loaded);
    assert!(!manager.is_timer_running());
    assert!(store.workout_logs().is_empty());
}

#[tokio::test]
async fn failed_load_keeps_previous_preview() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, Some(5), None).await.unwrap();

    store.fail(StoreOp::FetchWorkout);
    let err = manager.load_workout(WORKOUT_ID, None, None).await.unwrap_err();
    assert!(matches!(err, SessionError::Persistence(_)));
    assert_eq!(manager.workout().map(|w| w.id), Some(WORKOUT_ID));
    assert_eq!(manager.program_id(), Some(5));
    assert_eq!(manager.phase(), SessionPhase::Loaded);
}

#[tokio::test]
async fn loading_unknown_workout_fails() {
    let (mut manager, _, _) = harness();
    let err = manager.load_workout(404, None, None).await.unwrap_err();
    assert!(matches!(err, SessionError::Persistence(msg) if msg.contains("404")));
    assert_eq!(manager.phase(), SessionPhase::Empty);
}

#[tokio::test]
async fn cannot_reload_while_started() {
    let (mut manager, _, _) = started().await;
    let err = manager.load_workout(WORKOUT_ID, None, None).await.unwrap_err();
    assert_eq!(err, SessionError::AlreadyStarted);
    assert_eq!(manager.phase(), SessionPhase::Started);
}

// Beginning

#[tokio::test]
async fn begin_requires_a_loaded_workout() {
    let (mut manager, store, _) = harness();
    let err = manager.begin_workout().await.unwrap_err();
    assert_eq!(err, SessionError::NoSessionLoaded);
    assert_eq!(store.calls(StoreOp::InsertWorkoutLog), 0);
}

#[tokio::test]
async fn begin_persists_a_log_and_starts_the_clock() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, Some(3), None).await.unwrap();
    let log_id = manager.begin_workout().await.unwrap();

    let log = store.workout_log(log_id).unwrap();
    assert_eq!(log.user_id, USER);
    assert_eq!(log.workout_id, WORKOUT_ID);
    assert_eq!(log.program_id, Some(3));
    assert_eq!(log.started_at, start_time());
    assert_eq!(log.completed_at, None);

    assert_eq!(manager.phase(), SessionPhase::Started);
    assert_eq!(manager.workout_log_id(), Some(log_id));
    assert!(manager.is_timer_running());
    assert!(!manager.is_paused());
}

#[tokio::test]
async fn second_begin_is_rejected() {
    let (mut manager, store, _) = started().await;
    let err = manager.begin_workout().await.unwrap_err();
    assert_eq!(err, SessionError::AlreadyStarted);
    assert_eq!(store.workout_logs().len(), 1);
    assert_eq!(store.calls(StoreOp::InsertWorkoutLog), 1);
}

#[tokio::test]
async fn begin_adopts_template_program_first() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, None, Some(77)).await.unwrap();
    let log_id = manager.begin_workout().await.unwrap();

    let adopted = store.adopted_program(USER, 77);
    assert!(adopted.is_some());
    assert_eq!(manager.program_id(), adopted);
    assert_eq!(store.workout_log(log_id).unwrap().program_id, adopted);
}

#[tokio::test]
async fn known_program_skips_adoption() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, Some(12), Some(77)).await.unwrap();
    manager.begin_workout().await.unwrap();
    assert_eq!(store.calls(StoreOp::StartProgram), 0);
}

#[tokio::test]
async fn failed_adoption_aborts_begin() {
    let (mut manager, store, _) = harness();
    store.reject_template(77);
    manager.load_workout(WORKOUT_ID, None, Some(77)).await.unwrap();

    let err = manager.begin_workout().await.unwrap_err();
    assert!(matches!(err, SessionError::ProgramStart(_)));
    assert_eq!(manager.phase(), SessionPhase::Loaded);
    assert!(store.workout_logs().is_empty());

    store.fail(StoreOp::StartProgram);
    let err = manager.begin_workout().await.unwrap_err();
    assert!(matches!(err, SessionError::ProgramStart(msg) if msg.contains("injected")));
    assert_eq!(store.calls(StoreOp::InsertWorkoutLog), 0);
}

#[tokio::test]
async fn failed_log_insert_leaves_session_loaded() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();
    store.fail(StoreOp::InsertWorkoutLog);

    assert!(matches!(
        manager.begin_workout().await,
        Err(SessionError::Persistence(_))
    ));
    assert_eq!(manager.phase(), SessionPhase::Loaded);
    assert!(!manager.is_timer_running());

    store.recover(StoreOp::InsertWorkoutLog);
    manager.begin_workout().await.unwrap();
    assert_eq!(manager.error(), None);
}

// Elapsed time

#[tokio::test]
async fn elapsed_follows_the_clock_on_each_tick() {
    let (manager, _, clock) = started().await;
    for expected in 1..=5 {
        clock.advance_secs(1);
        assert_eq!(manager.tick(), expected);
    }
    assert_eq!(manager.elapsed_seconds(), 5);
}

#[tokio::test]
async fn missed_ticks_self_correct() {
    let (manager, _, clock) = started().await;
    clock.advance_secs(600);
    assert_eq!(manager.tick(), 600);
}

#[tokio::test]
async fn elapsed_after_resume_excludes_every_pause() {
    let (mut manager, _, clock) = started().await;
    let mut wall = 0;
    let mut paused_total = 0;

    for (work, rest) in [(10, 5), (3, 40), (7, 1), (0, 2)] {
        clock.advance_secs(work);
        wall += work;
        assert!(manager.toggle_pause().unwrap());

        clock.advance_secs(rest);
        wall += rest;
        paused_total += rest;
        assert!(!manager.toggle_pause().unwrap());

        assert_eq!(manager.elapsed_seconds(), wall - paused_total);
    }
}

#[tokio::test]
async fn ticks_do_not_advance_while_paused() {
    let (mut manager, _, clock) = started().await;
    clock.advance_secs(8);
    manager.toggle_pause().unwrap();
    assert_eq!(manager.elapsed_seconds(), 8);

    clock.advance_secs(30);
    assert_eq!(manager.tick(), 8);
    assert!(manager.is_paused());
}

#[tokio::test]
async fn pause_requires_a_started_session() {
    let (mut manager, _, _) = harness();
    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();
    assert_eq!(manager.toggle_pause(), Err(SessionError::NoActiveSession));
    assert!(!manager.is_paused());
}

#[tokio::test(start_paused = true)]
async fn background_timer_runs_only_while_unpaused() {
    let (mut manager, _, clock) = started().await;

    clock.advance_secs(3);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(manager.elapsed_seconds(), 3);

    manager.toggle_pause().unwrap();
    clock.advance_secs(10);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(manager.elapsed_seconds(), 3);

    manager.toggle_pause().unwrap();
    clock.advance_secs(2);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(manager.elapsed_seconds(), 5);
}

// Rest timer

#[tokio::test(start_paused = true)]
async fn rest_timer_counts_down_and_clears() {
    let (mut manager, _, _) = harness();
    manager.start_rest_timer(3);
    assert!(manager.is_resting());
    assert_eq!(manager.rest_seconds_remaining(), 3);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(manager.rest_seconds_remaining(), 2);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!manager.is_resting());
    assert_eq!(manager.rest_seconds_remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn rest_counts_whole_seconds_with_a_fast_tick() {
    let (manager, _, _) = harness();
    let mut manager = manager.with_config(&RotaConfig {
        tick_interval: Duration::from_millis(250),
        ..RotaConfig::default()
    });
    manager.start_rest_timer(4);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(manager.is_resting());
    assert_eq!(manager.rest_seconds_remaining(), 3);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(manager.is_resting());
    assert_eq!(manager.rest_seconds_remaining(), 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!manager.is_resting());
}

#[tokio::test(start_paused = true)]
async fn restarting_rest_leaves_one_countdown() {
    let (mut manager, _, _) = harness();
    manager.start_rest_timer(10);
    manager.start_rest_timer(4);
    assert_eq!(manager.rest_seconds_remaining(), 4);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(manager.rest_seconds_remaining(), 2);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!manager.is_resting());

    // The replaced countdown must not come back.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(!manager.is_resting());
    assert_eq!(manager.rest_seconds_remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn stopping_rest_cancels_early() {
    let (mut manager, _, _) = harness();
    manager.start_rest_timer(60);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    manager.stop_rest_timer();

    assert!(!manager.is_resting());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(manager.rest_seconds_remaining(), 0);
}

#[tokio::test]
async fn zero_second_rest_is_inactive() {
    let (mut manager, _, _) = harness();
    manager.start_rest_timer(0);
    assert!(!manager.is_resting());
}

#[tokio::test]
async fn rest_for_set_uses_target_or_default() {
    let (mut manager, _, _) = harness();
    assert_eq!(
        manager.start_rest_for_set(1),
        Err(SessionError::NoSessionLoaded)
    );

    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();
    assert_eq!(manager.start_rest_for_set(1), Ok(120));
    assert_eq!(manager.rest_seconds_remaining(), 120);

    // Third exercise has no rest time of its own.
    assert_eq!(manager.start_rest_for_set(7), Ok(90));
    assert_eq!(
        manager.start_rest_for_set(99),
        Err(SessionError::UnknownTargetSet(99))
    );
    manager.stop_rest_timer();
}

// Sets

#[tokio::test]
async fn complete_set_needs_a_started_session() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();

    let err = manager.complete_set(set_input(1, 8, 80.0)).await.unwrap_err();
    assert_eq!(err, SessionError::NoActiveSession);
    assert_eq!(store.calls(StoreOp::InsertSetLog), 0);
}

#[tokio::test]
async fn complete_set_rejects_unknown_target() {
    let (mut manager, _, _) = started().await;
    let err = manager.complete_set(set_input(42, 8, 80.0)).await.unwrap_err();
    assert_eq!(err, SessionError::UnknownTargetSet(42));
}

#[tokio::test]
async fn complete_set_records_and_persists() {
    let (mut manager, store, clock) = started().await;
    clock.advance_secs(45);

    let set = manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    assert_eq!(set.workout_log_id, manager.workout_log_id().unwrap());
    assert_eq!(set.exercise_id, 100);
    assert_eq!(set.completed_at, start_time() + chrono::TimeDelta::seconds(45));

    assert!(manager.is_set_completed(1));
    assert_eq!(manager.completed_set(1), Some(set.clone()));
    assert_eq!(store.set_logs(), vec![set]);
    assert_eq!(manager.progress().completed_sets, 1);
    assert_eq!(manager.progress().total_sets, 9);
}

#[tokio::test]
async fn complete_then_uncomplete_round_trips() {
    let (mut manager, store, _) = started().await;
    manager.complete_set(set_input(2, 10, 60.0)).await.unwrap();
    let before = manager.completed_sets();

    manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    assert!(manager.uncomplete_set(1).await.unwrap());

    assert_eq!(manager.completed_sets(), before);
    assert_eq!(store.set_logs(), before);
}

#[tokio::test]
async fn uncompleting_nothing_is_a_no_op() {
    let (mut manager, store, _) = started().await;
    assert!(!manager.uncomplete_set(3).await.unwrap());
    assert_eq!(store.calls(StoreOp::DeleteSetLog), 0);
}

#[tokio::test]
async fn recompleting_replaces_the_row() {
    let (mut manager, store, _) = started().await;
    let first = manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    let second = manager.complete_set(set_input(1, 10, 82.5)).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(manager.completed_sets(), vec![second.clone()]);
    assert_eq!(store.set_logs(), vec![second]);
    assert_eq!(store.calls(StoreOp::DeleteSetLog), 1);
}

#[tokio::test]
async fn failed_insert_keeps_prior_sets() {
    let (mut manager, store, _) = started().await;
    manager.complete_set(set_input(4, 8, 80.0)).await.unwrap();
    let before = manager.completed_sets();

    store.fail(StoreOp::InsertSetLog);
    let err = manager.complete_set(set_input(5, 8, 80.0)).await.unwrap_err();
    assert!(matches!(err, SessionError::Persistence(_)));
    assert_eq!(manager.error(), Some(err));
    assert_eq!(manager.completed_sets(), before);
}

#[tokio::test]
async fn failed_delete_keeps_the_entry() {
    let (mut manager, store, _) = started().await;
    let set = manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();

    store.fail(StoreOp::DeleteSetLog);
    assert!(manager.uncomplete_set(1).await.is_err());
    assert_eq!(manager.completed_set(1), Some(set.clone()));
    store.recover(StoreOp::DeleteSetLog);

    // The old row survives a failed replacement and the new one is rolled back.
    store.fail_once(StoreOp::DeleteSetLog);
    let err = manager.complete_set(set_input(1, 12, 80.0)).await.unwrap_err();
    assert!(matches!(err, SessionError::Persistence(_)));
    assert_eq!(manager.completed_set(1), Some(set.clone()));
    assert_eq!(store.set_logs(), vec![set]);
    assert_eq!(store.calls(StoreOp::InsertSetLog), 2);
}

#[tokio::test]
async fn failed_replacement_insert_keeps_the_old_set() {
    let (mut manager, store, _) = started().await;
    let set = manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();

    store.fail(StoreOp::InsertSetLog);
    let err = manager.complete_set(set_input(1, 10, 85.0)).await.unwrap_err();
    assert!(matches!(err, SessionError::Persistence(_)));
    assert_eq!(manager.error(), Some(err));
    assert_eq!(manager.completed_set(1), Some(set.clone()));
    assert_eq!(store.set_logs(), vec![set]);
    assert_eq!(store.calls(StoreOp::DeleteSetLog), 0);

    store.recover(StoreOp::InsertSetLog);
    let replaced = manager.complete_set(set_input(1, 10, 85.0)).await.unwrap();
    assert_eq!(store.set_logs(), vec![replaced]);
}

// Finishing and cancelling

#[tokio::test]
async fn finish_without_begin_fails_untouched() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();

    let err = manager.finish_workout().await.unwrap_err();
    assert_eq!(err, SessionError::NoActiveSession);
    assert_eq!(store.calls(StoreOp::CompleteWorkoutLog), 0);
    assert!(store.workout_logs().is_empty());
    assert_eq!(manager.phase(), SessionPhase::Loaded);
}

#[tokio::test]
async fn full_workout_scenario() {
    let (mut manager, store, clock) = harness();
    let workout = manager.load_workout(WORKOUT_ID, None, None).await.unwrap();
    assert_eq!(workout.exercises.len(), 3);
    assert!(workout.exercises.iter().all(|e| e.sets.len() == 3));

    let log_id = manager.begin_workout().await.unwrap();
    let set = manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    assert_eq!(set.actual_reps, Some(8));
    assert_eq!(set.actual_weight, Some(80.0));

    for _ in 0..5 {
        clock.advance_secs(1);
        manager.tick();
    }
    assert_eq!(manager.elapsed_seconds(), 5);

    let summary = manager.finish_workout().await.unwrap();
    assert_eq!(summary.workout_log_id, log_id);
    assert_eq!(summary.set_logs.len(), 1);
    assert_eq!(summary.set_logs[0].exercise_set_id, 1);
    assert_eq!(summary.duration_seconds, 5);
    assert_eq!(summary.started_at, start_time());
    assert_eq!(summary.workout, workout);

    let log = store.workout_log(log_id).unwrap();
    assert_eq!(log.duration_seconds, Some(5));
    assert_eq!(log.completed_at, Some(summary.completed_at));

    assert_eq!(manager.phase(), SessionPhase::Empty);
    assert!(manager.completed_sets().is_empty());
    assert!(!manager.is_timer_running());
    assert_eq!(manager.elapsed_seconds(), 0);
}

#[tokio::test]
async fn paused_time_is_excluded_from_duration() {
    let (mut manager, _, clock) = started().await;

    clock.advance_secs(10);
    manager.toggle_pause().unwrap();
    clock.advance_secs(5);
    manager.toggle_pause().unwrap();
    clock.advance_secs(5);

    let summary = manager.finish_workout().await.unwrap();
    assert_eq!(summary.duration_seconds, 15);
}

#[tokio::test]
async fn finishing_while_paused_stops_at_the_pause() {
    let (mut manager, _, clock) = started().await;
    clock.advance_secs(20);
    manager.toggle_pause().unwrap();
    clock.advance_secs(100);

    let summary = manager.finish_workout().await.unwrap();
    assert_eq!(summary.duration_seconds, 20);
}

#[tokio::test]
async fn failed_finish_keeps_the_session() {
    let (mut manager, store, clock) = started().await;
    manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    clock.advance_secs(30);

    store.fail(StoreOp::CompleteWorkoutLog);
    let err = manager.finish_workout().await.unwrap_err();
    assert!(matches!(err, SessionError::Persistence(_)));
    assert_eq!(manager.phase(), SessionPhase::Started);
    assert!(manager.is_timer_running());
    assert_eq!(manager.completed_sets().len(), 1);
    assert_eq!(manager.error(), Some(err));

    store.recover(StoreOp::CompleteWorkoutLog);
    let summary = manager.finish_workout().await.unwrap();
    assert_eq!(summary.duration_seconds, 30);
    assert_eq!(summary.set_logs.len(), 1);
    assert_eq!(manager.error(), None);
}

#[tokio::test]
async fn cancel_removes_persisted_attempt() {
    let (mut manager, store, _) = started().await;
    manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    manager.complete_set(set_input(2, 8, 80.0)).await.unwrap();

    manager.cancel_workout().await;
    assert!(store.workout_logs().is_empty());
    assert!(store.set_logs().is_empty());
    assert_eq!(manager.phase(), SessionPhase::Empty);
}

#[tokio::test]
async fn cancel_always_ends_empty() {
    let (mut manager, store, _) = started().await;
    manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    manager.start_rest_timer(30);
    manager.toggle_pause().unwrap();

    store.fail(StoreOp::DeleteSetLogs);
    store.fail(StoreOp::DeleteWorkoutLog);
    manager.cancel_workout().await;

    assert_eq!(manager.phase(), SessionPhase::Empty);
    assert!(!manager.is_timer_running());
    assert!(!manager.is_resting());
    assert!(!manager.is_paused());
    assert!(manager.completed_sets().is_empty());
    assert_eq!(manager.error(), None);
    // The rows are still there; cleanup was best-effort.
    assert_eq!(store.workout_logs().len(), 1);
    assert_eq!(store.calls(StoreOp::DeleteWorkoutLog), 1);
}

#[tokio::test]
async fn cancel_from_preview_touches_nothing() {
    let (mut manager, store, _) = harness();
    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();
    manager.cancel_workout().await;

    assert_eq!(manager.phase(), SessionPhase::Empty);
    assert_eq!(store.calls(StoreOp::DeleteSetLogs), 0);
    assert_eq!(store.calls(StoreOp::DeleteWorkoutLog), 0);
}

#[tokio::test]
async fn observer_tracks_the_manager() {
    let (mut manager, _, clock) = harness();
    let observer = manager.observer();
    assert_eq!(observer.phase(), SessionPhase::Empty);

    manager.load_workout(WORKOUT_ID, None, None).await.unwrap();
    manager.begin_workout().await.unwrap();
    manager.complete_set(set_input(1, 8, 80.0)).await.unwrap();
    clock.advance_secs(12);
    manager.tick();

    let view = observer.view();
    assert_eq!(view.phase, SessionPhase::Started);
    assert_eq!(view.elapsed_seconds, 12);
    assert_eq!(view.completed_sets.len(), 1);
    assert_eq!(view.progress.completed_sets, 1);
    assert!(view.error.is_none());

    manager.cancel_workout().await;
    assert_eq!(observer.phase(), SessionPhase::Empty);
}
