//! Demo data: one template program with a single three-exercise workout.

use anyhow::Result;
use log::info;
use sqlx::SqlitePool;

use crate::db::models::{NewTargetSet, NewTemplateExercise, NewWorkoutTemplate};
use crate::db::operations::{create_template_program, create_workout_template};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededProgram {
    pub template_program_id: i64,
    pub workout_id: i64,
}

fn strength(name: &str, reps: i64, weight: f64) -> NewTemplateExercise {
    NewTemplateExercise {
        name: name.to_string(),
        is_cardio: false,
        sets: (0..3)
            .map(|_| NewTargetSet::strength(reps, weight, 90))
            .collect(),
    }
}

pub async fn seed_demo_program(pool: &SqlitePool) -> Result<SeededProgram> {
    let template_program_id = create_template_program(pool, "Full Body Starter").await?;
    let workout_id = create_workout_template(
        pool,
        &NewWorkoutTemplate {
            name: "Full Body A".into(),
            program_id: Some(template_program_id),
            exercises: vec![
                strength("Barbell Back Squat", 5, 100.0),
                strength("Bench Press", 8, 80.0),
                strength("Barbell Row", 8, 70.0),
            ],
        },
    )
    .await?;

    info!(
        "Seeded template program {} with workout {}",
        template_program_id, workout_id
    );
    Ok(SeededProgram {
        template_program_id,
        workout_id,
    })
}
