//! Per-day exercise session construction: settings resolution and random
//! exercise selection.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use sqlx::SqlitePool;
use uuid::Uuid;

use fitplan_db::models::{ExerciseDay, SessionSettings};
use fitplan_db::queries::{exercise_days, settings};

use crate::error::PlanError;

/// Target number of exercises drawn per day (fewer when the pool is smaller).
pub const EXERCISES_PER_DAY: usize = 20;

/// Caller-supplied session parameters for one day.
///
/// When `settings_id` is present, that record is updated-or-created and may
/// end up shared with other days referencing the same id; otherwise a fresh
/// record is made. Omitted parameters keep the record's current values on
/// update and take the global defaults on insert.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionSpec {
    pub settings_id: Option<Uuid>,
    pub round: Option<i64>,
    pub exercise_time: Option<i64>,
    pub num_of_workouts_per_round: Option<i64>,
}

impl SessionSpec {
    fn patch(&self) -> settings::SettingsPatch {
        settings::SettingsPatch {
            round: self.round,
            exercise_time: self.exercise_time,
            num_of_workouts_per_round: self.num_of_workouts_per_round,
        }
    }
}

/// Resolve a session spec to a persisted settings record, atomically.
pub async fn resolve_settings(
    pool: &SqlitePool,
    spec: &SessionSpec,
) -> Result<SessionSettings, PlanError> {
    let resolved = match spec.settings_id {
        Some(id) => settings::upsert_settings(pool, id, &spec.patch()).await?,
        None => settings::insert_settings(pool, &spec.patch()).await?,
    };
    Ok(resolved)
}

/// Draw up to `count` exercises from the pool, without replacement.
///
/// Unweighted random sampling; no ordering guarantee. An empty pool yields
/// an empty selection.
pub fn sample_exercises(pool_ids: &[Uuid], count: usize) -> Vec<Uuid> {
    let mut rng = rand::rng();
    pool_ids
        .choose_multiple(&mut rng, count.min(pool_ids.len()))
        .copied()
        .collect()
}

/// Build and persist one day's exercise session: settings record, day
/// collection, and a randomly sampled entry set.
///
/// Returns the day collection together with the chosen exercise ids (the
/// meal selector reads these to derive the day's intensity).
pub async fn build_exercise_day(
    pool: &SqlitePool,
    date: DateTime<Utc>,
    plan_id: i64,
    spec: &SessionSpec,
    exercise_pool: &[Uuid],
) -> Result<(ExerciseDay, Vec<Uuid>), PlanError> {
    let settings = resolve_settings(pool, spec).await?;
    let day = exercise_days::insert_day(pool, date, plan_id, settings.id).await?;

    let chosen = sample_exercises(exercise_pool, EXERCISES_PER_DAY);
    exercise_days::replace_entries(pool, day.id, &chosen).await?;

    tracing::debug!(
        day_id = %day.id,
        plan_id,
        exercises = chosen.len(),
        "built exercise day"
    );

    Ok((day, chosen))
}
