//! Database query functions for exercise day collections and their entries.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{ExerciseDay, ExerciseEntry};

/// Insert a new exercise day collection.
pub async fn insert_day(
    pool: &SqlitePool,
    date: DateTime<Utc>,
    plan_id: i64,
    settings_id: Uuid,
) -> Result<ExerciseDay> {
    let day = sqlx::query_as::<_, ExerciseDay>(
        "INSERT INTO exercise_days (id, date, plan_id, settings_id) \
         VALUES (?, ?, ?, ?) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(date)
    .bind(plan_id)
    .bind(settings_id)
    .fetch_one(pool)
    .await
    .context("failed to insert exercise day")?;

    Ok(day)
}

/// Fetch an exercise day by id.
pub async fn get_day(pool: &SqlitePool, id: Uuid) -> Result<Option<ExerciseDay>> {
    let day = sqlx::query_as::<_, ExerciseDay>("SELECT * FROM exercise_days WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch exercise day")?;

    Ok(day)
}

/// List a plan's exercise days in ascending date order.
pub async fn list_days_for_plan(pool: &SqlitePool, plan_id: i64) -> Result<Vec<ExerciseDay>> {
    let days = sqlx::query_as::<_, ExerciseDay>(
        "SELECT * FROM exercise_days WHERE plan_id = ? ORDER BY date ASC",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list exercise days")?;

    Ok(days)
}

/// Update an exercise day's own fields. `None` leaves a field unchanged.
pub async fn update_day(
    pool: &SqlitePool,
    id: Uuid,
    date: Option<DateTime<Utc>>,
    plan_id: Option<i64>,
    settings_id: Uuid,
) -> Result<ExerciseDay> {
    let day = sqlx::query_as::<_, ExerciseDay>(
        "UPDATE exercise_days \
         SET date = COALESCE(?, date), \
             plan_id = COALESCE(?, plan_id), \
             settings_id = ? \
         WHERE id = ? \
         RETURNING *",
    )
    .bind(date)
    .bind(plan_id)
    .bind(settings_id)
    .bind(id)
    .fetch_one(pool)
    .await
    .context("failed to update exercise day")?;

    Ok(day)
}

/// Replace the full entry set of a day, atomically.
pub async fn replace_entries(
    pool: &SqlitePool,
    day_id: Uuid,
    exercise_ids: &[Uuid],
) -> Result<Vec<ExerciseEntry>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query("DELETE FROM exercise_entries WHERE day_id = ?")
        .bind(day_id)
        .execute(&mut *tx)
        .await
        .context("failed to clear exercise entries")?;

    let mut entries = Vec::with_capacity(exercise_ids.len());
    for exercise_id in exercise_ids {
        let entry = sqlx::query_as::<_, ExerciseEntry>(
            "INSERT INTO exercise_entries (id, exercise_id, day_id) \
             VALUES (?, ?, ?) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(exercise_id)
        .bind(day_id)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert exercise entry {exercise_id}"))?;
        entries.push(entry);
    }

    tx.commit().await.context("failed to commit transaction")?;
    Ok(entries)
}

/// List the entries of one exercise day.
pub async fn list_entries(pool: &SqlitePool, day_id: Uuid) -> Result<Vec<ExerciseEntry>> {
    let entries = sqlx::query_as::<_, ExerciseEntry>(
        "SELECT * FROM exercise_entries WHERE day_id = ?",
    )
    .bind(day_id)
    .fetch_all(pool)
    .await
    .context("failed to list exercise entries")?;

    Ok(entries)
}

/// Delete the entries of one exercise day.
pub async fn delete_entries_for_day(pool: &SqlitePool, day_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercise_entries WHERE day_id = ?")
        .bind(day_id)
        .execute(pool)
        .await
        .context("failed to delete exercise entries")?;

    Ok(result.rows_affected())
}

/// Delete the entries of every exercise day in a plan, in one statement.
pub async fn delete_entries_for_plan(pool: &SqlitePool, plan_id: i64) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM exercise_entries \
         WHERE day_id IN (SELECT id FROM exercise_days WHERE plan_id = ?)",
    )
    .bind(plan_id)
    .execute(pool)
    .await
    .context("failed to delete exercise entries for plan")?;

    Ok(result.rows_affected())
}

/// Delete one exercise day. Returns whether a row was removed.
pub async fn delete_day(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM exercise_days WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete exercise day")?;

    Ok(result.rows_affected() > 0)
}

/// Delete all exercise days of a plan. Returns the number removed.
pub async fn delete_days_for_plan(pool: &SqlitePool, plan_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM exercise_days WHERE plan_id = ?")
        .bind(plan_id)
        .execute(pool)
        .await
        .context("failed to delete exercise days for plan")?;

    Ok(result.rows_affected())
}

/// Distinct settings ids referenced by a plan's exercise days.
pub async fn distinct_settings_for_plan(pool: &SqlitePool, plan_id: i64) -> Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT DISTINCT settings_id FROM exercise_days WHERE plan_id = ?",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to collect settings ids for plan")?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
