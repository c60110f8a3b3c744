//! Database query functions for the `session_settings` table.
//!
//! Settings rows are shared resources: several exercise days may reference
//! one row, so deletion is gated on reference scans (see
//! [`count_referencing_days_excluding`] and
//! [`count_referencing_days_outside_plan`]) and is idempotent to tolerate
//! the concurrent double-delete race.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::SessionSettings;

/// Patchable session parameters. `None` fields fall back to the row's
/// current values on update, or to the global defaults on insert.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPatch {
    pub round: Option<i64>,
    pub exercise_time: Option<i64>,
    pub num_of_workouts_per_round: Option<i64>,
}

/// Insert a fresh settings row, defaulting any omitted field.
pub async fn insert_settings(pool: &SqlitePool, patch: &SettingsPatch) -> Result<SessionSettings> {
    let settings = sqlx::query_as::<_, SessionSettings>(
        "INSERT INTO session_settings \
           (id, round, num_of_workouts_per_round, is_start_with_warm_up, is_shuffle, \
            exercise_time, transition_time, rest_time, rest_frequency, created_at) \
         VALUES (?, ?, ?, TRUE, TRUE, ?, ?, ?, ?, ?) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(patch.round.unwrap_or(SessionSettings::DEFAULT_ROUND))
    .bind(
        patch
            .num_of_workouts_per_round
            .unwrap_or(SessionSettings::DEFAULT_WORKOUTS_PER_ROUND),
    )
    .bind(
        patch
            .exercise_time
            .unwrap_or(SessionSettings::DEFAULT_EXERCISE_TIME),
    )
    .bind(SessionSettings::DEFAULT_TRANSITION_TIME)
    .bind(SessionSettings::DEFAULT_REST_TIME)
    .bind(SessionSettings::DEFAULT_REST_FREQUENCY)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .context("failed to insert session settings")?;

    Ok(settings)
}

/// Update-or-create the settings row with the given id, in one atomic
/// statement.
///
/// On update, only the patched fields change and omitted fields keep their
/// current values; on insert, omitted fields take the global defaults. No
/// intermediate state is observable either way.
pub async fn upsert_settings(
    pool: &SqlitePool,
    id: Uuid,
    patch: &SettingsPatch,
) -> Result<SessionSettings> {
    let settings = sqlx::query_as::<_, SessionSettings>(
        "INSERT INTO session_settings \
           (id, round, num_of_workouts_per_round, is_start_with_warm_up, is_shuffle, \
            exercise_time, transition_time, rest_time, rest_frequency, created_at) \
         VALUES (?, ?, ?, TRUE, TRUE, ?, ?, ?, ?, ?) \
         ON CONFLICT (id) DO UPDATE SET \
           round = COALESCE(?, round), \
           num_of_workouts_per_round = COALESCE(?, num_of_workouts_per_round), \
           exercise_time = COALESCE(?, exercise_time) \
         RETURNING *",
    )
    .bind(id)
    .bind(patch.round.unwrap_or(SessionSettings::DEFAULT_ROUND))
    .bind(
        patch
            .num_of_workouts_per_round
            .unwrap_or(SessionSettings::DEFAULT_WORKOUTS_PER_ROUND),
    )
    .bind(
        patch
            .exercise_time
            .unwrap_or(SessionSettings::DEFAULT_EXERCISE_TIME),
    )
    .bind(SessionSettings::DEFAULT_TRANSITION_TIME)
    .bind(SessionSettings::DEFAULT_REST_TIME)
    .bind(SessionSettings::DEFAULT_REST_FREQUENCY)
    .bind(Utc::now())
    .bind(patch.round)
    .bind(patch.num_of_workouts_per_round)
    .bind(patch.exercise_time)
    .fetch_one(pool)
    .await
    .context("failed to upsert session settings")?;

    Ok(settings)
}

/// Fetch a settings row by id.
pub async fn get_settings(pool: &SqlitePool, id: Uuid) -> Result<Option<SessionSettings>> {
    let settings = sqlx::query_as::<_, SessionSettings>(
        "SELECT * FROM session_settings WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch session settings")?;

    Ok(settings)
}

/// Delete a settings row. Returns whether a row was removed; deleting an
/// already-deleted row is a successful no-op.
pub async fn delete_settings(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM session_settings WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete session settings")?;

    Ok(result.rows_affected() > 0)
}

/// Count exercise days referencing a settings row, excluding one day.
///
/// Used by single-day deletion: the settings row may go only when this
/// returns zero.
pub async fn count_referencing_days_excluding(
    pool: &SqlitePool,
    settings_id: Uuid,
    excluded_day_id: Uuid,
) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM exercise_days WHERE settings_id = ? AND id <> ?",
    )
    .bind(settings_id)
    .bind(excluded_day_id)
    .fetch_one(pool)
    .await
    .context("failed to count referencing exercise days")?;

    Ok(count)
}

/// Count exercise days referencing a settings row outside the given plan.
///
/// Used by batch deletion: all of the plan's own days are about to go, so
/// only references from other plans keep the settings row alive.
pub async fn count_referencing_days_outside_plan(
    pool: &SqlitePool,
    settings_id: Uuid,
    plan_id: i64,
) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM exercise_days WHERE settings_id = ? AND plan_id <> ?",
    )
    .bind(settings_id)
    .bind(plan_id)
    .fetch_one(pool)
    .await
    .context("failed to count referencing exercise days outside plan")?;

    Ok(count)
}
