use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::db::models::{
    NewWorkoutTemplate, ProgramRow, SetLogRow, TemplateSetRow, WorkoutLogRow, WorkoutRow,
    assemble_template,
};
use crate::models::{NewSetLog, NewWorkoutLog, SetLog, WorkoutLog, WorkoutTemplate};

// Workouts

pub async fn get_workout_template(pool: &SqlitePool, workout_id: i64) -> Result<WorkoutTemplate> {
    let workout = sqlx::query_as::<_, WorkoutRow>(
        "SELECT id, program_id, name FROM workouts WHERE id = ?1",
    )
    .bind(workout_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| anyhow!("workout {} not found", workout_id))?;

    let rows = sqlx::query_as::<_, TemplateSetRow>(
        "SELECT we.id AS workout_exercise_id,
                we.exercise_id AS exercise_id,
                e.name AS exercise_name,
                e.is_cardio AS is_cardio,
                we.sort_order AS sort_order,
                es.id AS set_id,
                es.set_number AS set_number,
                es.target_reps AS target_reps,
                es.target_weight AS target_weight,
                es.target_duration_seconds AS target_duration_seconds,
                es.target_distance_meters AS target_distance_meters,
                es.rest_seconds AS rest_seconds
         FROM workout_exercises we
         JOIN exercises e ON e.id = we.exercise_id
         LEFT JOIN exercise_sets es ON es.workout_exercise_id = we.id
         WHERE we.workout_id = ?1
         ORDER BY we.sort_order, we.id, es.set_number, es.id",
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await?;

    Ok(assemble_template(workout, rows))
}

/// Insert a workout with its exercises and target sets; returns the workout id.
pub async fn create_workout_template(pool: &SqlitePool, new: &NewWorkoutTemplate) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let workout_id = sqlx::query("INSERT INTO workouts (program_id, name) VALUES (?1, ?2)")
        .bind(new.program_id)
        .bind(&new.name)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for (sort_order, exercise) in new.exercises.iter().enumerate() {
        let exercise_id = match sqlx::query_scalar::<_, i64>(
            "SELECT id FROM exercises WHERE name = ?1",
        )
        .bind(&exercise.name)
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(id) => id,
            None => sqlx::query("INSERT INTO exercises (name, is_cardio) VALUES (?1, ?2)")
                .bind(&exercise.name)
                .bind(exercise.is_cardio)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid(),
        };

        let workout_exercise_id = sqlx::query(
            "INSERT INTO workout_exercises (workout_id, exercise_id, sort_order) VALUES (?1, ?2, ?3)",
        )
        .bind(workout_id)
        .bind(exercise_id)
        .bind(sort_order as i64)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for (idx, set) in exercise.sets.iter().enumerate() {
            sqlx::query(
                "INSERT INTO exercise_sets (workout_exercise_id, set_number, target_reps, target_weight,
                    target_duration_seconds, target_distance_meters, rest_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(workout_exercise_id)
            .bind(idx as i64 + 1)
            .bind(set.target_reps)
            .bind(set.target_weight)
            .bind(set.target_duration_seconds)
            .bind(set.target_distance_meters)
            .bind(set.rest_seconds)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(workout_id)
}

pub async fn list_workouts(pool: &SqlitePool) -> Result<Vec<WorkoutRow>> {
    sqlx::query_as::<_, WorkoutRow>(
        "SELECT id, program_id, name FROM workouts ORDER BY program_id, day_index, id",
    )
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

// Programs

pub async fn create_template_program(pool: &SqlitePool, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO programs (name, is_template) VALUES (?1, 1)")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_program(pool: &SqlitePool, program_id: i64) -> Result<Option<ProgramRow>> {
    sqlx::query_as::<_, ProgramRow>(
        "SELECT id, user_id, template_id, name, is_template, is_active FROM programs WHERE id = ?1",
    )
    .bind(program_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

pub async fn find_adopted_program(
    pool: &SqlitePool,
    user_id: &str,
    template_id: i64,
) -> Result<Option<ProgramRow>> {
    sqlx::query_as::<_, ProgramRow>(
        "SELECT id, user_id, template_id, name, is_template, is_active FROM programs
         WHERE user_id = ?1 AND template_id = ?2
         ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(template_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

/// Copy a template program for `user_id` and make it the user's only active program.
/// Returns `None` when the template does not exist.
pub async fn adopt_template_program(
    pool: &SqlitePool,
    user_id: &str,
    template_id: i64,
    started_at: DateTime<Utc>,
) -> Result<Option<i64>> {
    let Some(template) = get_program(pool, template_id).await? else {
        return Ok(None);
    };
    if !template.is_template {
        return Err(anyhow!("program {} is not a template", template_id));
    }

    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE programs SET is_active = 0 WHERE user_id = ?1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    let program_id = sqlx::query(
        "INSERT INTO programs (user_id, template_id, name, is_template, is_active, started_at)
         VALUES (?1, ?2, ?3, 0, 1, ?4)",
    )
    .bind(user_id)
    .bind(template_id)
    .bind(&template.name)
    .bind(started_at)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();
    tx.commit().await?;

    Ok(Some(program_id))
}

// Workout logs

pub async fn insert_workout_log(pool: &SqlitePool, log: &NewWorkoutLog) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO workout_logs (user_id, workout_id, program_id, started_at)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(&log.user_id)
    .bind(log.workout_id)
    .bind(log.program_id)
    .bind(log.started_at)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn complete_workout_log(
    pool: &SqlitePool,
    workout_log_id: i64,
    completed_at: DateTime<Utc>,
    duration_seconds: i64,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE workout_logs SET completed_at = ?1, duration_seconds = ?2 WHERE id = ?3",
    )
    .bind(completed_at)
    .bind(duration_seconds)
    .bind(workout_log_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(anyhow!("workout log {} not found", workout_log_id));
    }
    Ok(())
}

pub async fn delete_workout_log(pool: &SqlitePool, workout_log_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM workout_logs WHERE id = ?1")
        .bind(workout_log_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn get_workout_log(pool: &SqlitePool, workout_log_id: i64) -> Result<Option<WorkoutLog>> {
    let row = sqlx::query_as::<_, WorkoutLogRow>(
        "SELECT id, user_id, workout_id, program_id, started_at, completed_at, duration_seconds
         FROM workout_logs WHERE id = ?1",
    )
    .bind(workout_log_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(WorkoutLog::from))
}

/// Workout logs for a user, most recent first. Only completed ones unless asked.
pub async fn list_workout_logs(
    pool: &SqlitePool,
    user_id: &str,
    include_in_progress: bool,
) -> Result<Vec<WorkoutLog>> {
    let rows = sqlx::query_as::<_, WorkoutLogRow>(
        "SELECT id, user_id, workout_id, program_id, started_at, completed_at, duration_seconds
         FROM workout_logs
         WHERE user_id = ?1 AND (?2 OR completed_at IS NOT NULL)
         ORDER BY started_at DESC, id DESC",
    )
    .bind(user_id)
    .bind(include_in_progress)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(WorkoutLog::from).collect())
}

// Set logs

pub async fn insert_set_log(pool: &SqlitePool, set: &NewSetLog) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO set_logs (workout_log_id, exercise_set_id, exercise_id, actual_reps,
            actual_weight, actual_duration_seconds, actual_distance_meters, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(set.workout_log_id)
    .bind(set.exercise_set_id)
    .bind(set.exercise_id)
    .bind(set.actual_reps)
    .bind(set.actual_weight)
    .bind(set.actual_duration_seconds)
    .bind(set.actual_distance_meters)
    .bind(set.completed_at)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_set_log(pool: &SqlitePool, set_log_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM set_logs WHERE id = ?1")
        .bind(set_log_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_set_logs_for_workout_log(pool: &SqlitePool, workout_log_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM set_logs WHERE workout_log_id = ?1")
        .bind(workout_log_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn get_set_logs_for_workout_log(
    pool: &SqlitePool,
    workout_log_id: i64,
) -> Result<Vec<SetLog>> {
    let rows = sqlx::query_as::<_, SetLogRow>(
        "SELECT id, workout_log_id, exercise_set_id, exercise_id, actual_reps, actual_weight,
                actual_duration_seconds, actual_distance_meters, completed_at
         FROM set_logs WHERE workout_log_id = ?1
         ORDER BY completed_at, id",
    )
    .bind(workout_log_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(SetLog::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::db::models::{NewTargetSet, NewTemplateExercise};
    use chrono::TimeZone;

    fn push_day(program_id: Option<i64>) -> NewWorkoutTemplate {
        NewWorkoutTemplate {
            name: "Push Day".into(),
            program_id,
            exercises: vec![
                NewTemplateExercise {
                    name: "Bench Press".into(),
                    is_cardio: false,
                    sets: vec![
                        NewTargetSet::strength(8, 80.0, 120),
                        NewTargetSet::strength(8, 80.0, 120),
                    ],
                },
                NewTemplateExercise {
                    name: "Rowing".into(),
                    is_cardio: true,
                    sets: vec![NewTargetSet::cardio(600, Some(2000.0))],
                },
            ],
        }
    }

    #[tokio::test]
    async fn template_round_trips_in_order() {
        let pool = connect_in_memory().await.unwrap();
        let workout_id = create_workout_template(&pool, &push_day(None)).await.unwrap();

        let template = get_workout_template(&pool, workout_id).await.unwrap();
        assert_eq!(template.name, "Push Day");
        assert_eq!(template.exercises.len(), 2);
        assert_eq!(template.exercises[0].name, "Bench Press");
        assert_eq!(
            template.exercises[0]
                .sets
                .iter()
                .map(|s| s.set_number)
                .collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(template.exercises[1].is_cardio);
        assert_eq!(template.exercises[1].sets[0].target_duration_seconds, Some(600));
    }

    #[tokio::test]
    async fn missing_workout_is_an_error() {
        let pool = connect_in_memory().await.unwrap();
        let err = get_workout_template(&pool, 404).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn workout_log_lifecycle() {
        let pool = connect_in_memory().await.unwrap();
        let workout_id = create_workout_template(&pool, &push_day(None)).await.unwrap();
        let template = get_workout_template(&pool, workout_id).await.unwrap();
        let started_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();

        let log_id = insert_workout_log(
            &pool,
            &NewWorkoutLog {
                user_id: "user-1".into(),
                workout_id,
                program_id: None,
                started_at,
            },
        )
        .await
        .unwrap();

        let first = &template.exercises[0];
        let set_id = insert_set_log(
            &pool,
            &NewSetLog {
                workout_log_id: log_id,
                exercise_set_id: first.sets[0].id,
                exercise_id: first.exercise_id,
                actual_reps: Some(8),
                actual_weight: Some(80.0),
                actual_duration_seconds: None,
                actual_distance_meters: None,
                completed_at: started_at + chrono::TimeDelta::seconds(60),
            },
        )
        .await
        .unwrap();

        assert!(list_workout_logs(&pool, "user-1", false).await.unwrap().is_empty());
        assert_eq!(list_workout_logs(&pool, "user-1", true).await.unwrap().len(), 1);

        complete_workout_log(&pool, log_id, started_at + chrono::TimeDelta::seconds(1800), 1800)
            .await
            .unwrap();
        let log = get_workout_log(&pool, log_id).await.unwrap().unwrap();
        assert_eq!(log.duration_seconds, Some(1800));
        assert_eq!(log.started_at, started_at);

        let sets = get_set_logs_for_workout_log(&pool, log_id).await.unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id, set_id);
        assert_eq!(sets[0].actual_weight, Some(80.0));

        // Children must go first.
        assert!(delete_workout_log(&pool, log_id).await.is_err());
        assert_eq!(delete_set_logs_for_workout_log(&pool, log_id).await.unwrap(), 1);
        assert_eq!(delete_workout_log(&pool, log_id).await.unwrap(), 1);
        assert!(get_workout_log(&pool, log_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn completing_unknown_log_fails() {
        let pool = connect_in_memory().await.unwrap();
        assert!(complete_workout_log(&pool, 9, Utc::now(), 10).await.is_err());
    }

    #[tokio::test]
    async fn adopting_a_template_program() {
        let pool = connect_in_memory().await.unwrap();
        let template_id = create_template_program(&pool, "Starter Strength").await.unwrap();
        let now = Utc::now();

        let first = adopt_template_program(&pool, "user-1", template_id, now)
            .await
            .unwrap()
            .unwrap();
        let second = adopt_template_program(&pool, "user-1", template_id, now)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(first, second);

        let older = get_program(&pool, first).await.unwrap().unwrap();
        let newer = get_program(&pool, second).await.unwrap().unwrap();
        assert!(!older.is_active);
        assert!(newer.is_active);
        assert_eq!(newer.template_id, Some(template_id));
        assert_eq!(newer.name, "Starter Strength");

        let found = find_adopted_program(&pool, "user-1", template_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, second);

        assert!(adopt_template_program(&pool, "user-1", 999, now)
            .await
            .unwrap()
            .is_none());
        assert!(adopt_template_program(&pool, "user-1", second, now)
            .await
            .is_err());
    }
}
