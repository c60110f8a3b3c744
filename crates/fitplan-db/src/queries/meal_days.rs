//! Database query functions for meal day collections and their entries.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{MealDay, MealEntry};

/// Multiplier applied to the base calorie target when none is given.
pub const DEFAULT_MEAL_RATIO: f64 = 1.0;

/// Insert a new meal day collection.
pub async fn insert_day(
    pool: &SqlitePool,
    date: DateTime<Utc>,
    plan_id: i64,
    meal_ratio: f64,
) -> Result<MealDay> {
    let day = sqlx::query_as::<_, MealDay>(
        "INSERT INTO meal_days (id, date, plan_id, meal_ratio) \
         VALUES (?, ?, ?, ?) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(date)
    .bind(plan_id)
    .bind(meal_ratio)
    .fetch_one(pool)
    .await
    .context("failed to insert meal day")?;

    Ok(day)
}

/// Fetch a meal day by id.
pub async fn get_day(pool: &SqlitePool, id: Uuid) -> Result<Option<MealDay>> {
    let day = sqlx::query_as::<_, MealDay>("SELECT * FROM meal_days WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch meal day")?;

    Ok(day)
}

/// List a plan's meal days in ascending date order.
pub async fn list_days_for_plan(pool: &SqlitePool, plan_id: i64) -> Result<Vec<MealDay>> {
    let days = sqlx::query_as::<_, MealDay>(
        "SELECT * FROM meal_days WHERE plan_id = ? ORDER BY date ASC",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .context("failed to list meal days")?;

    Ok(days)
}

/// Update a meal day's own fields. `None` leaves a field unchanged.
pub async fn update_day(
    pool: &SqlitePool,
    id: Uuid,
    date: Option<DateTime<Utc>>,
    plan_id: Option<i64>,
    meal_ratio: Option<f64>,
) -> Result<MealDay> {
    let day = sqlx::query_as::<_, MealDay>(
        "UPDATE meal_days \
         SET date = COALESCE(?, date), \
             plan_id = COALESCE(?, plan_id), \
             meal_ratio = COALESCE(?, meal_ratio) \
         WHERE id = ? \
         RETURNING *",
    )
    .bind(date)
    .bind(plan_id)
    .bind(meal_ratio)
    .bind(id)
    .fetch_one(pool)
    .await
    .context("failed to update meal day")?;

    Ok(day)
}

/// Replace the full entry set of a day, atomically.
pub async fn replace_entries(
    pool: &SqlitePool,
    day_id: Uuid,
    meal_ids: &[Uuid],
) -> Result<Vec<MealEntry>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query("DELETE FROM meal_entries WHERE day_id = ?")
        .bind(day_id)
        .execute(&mut *tx)
        .await
        .context("failed to clear meal entries")?;

    let mut entries = Vec::with_capacity(meal_ids.len());
    for meal_id in meal_ids {
        let entry = sqlx::query_as::<_, MealEntry>(
            "INSERT INTO meal_entries (id, meal_id, day_id) \
             VALUES (?, ?, ?) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(meal_id)
        .bind(day_id)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert meal entry {meal_id}"))?;
        entries.push(entry);
    }

    tx.commit().await.context("failed to commit transaction")?;
    Ok(entries)
}

/// List the entries of one meal day.
pub async fn list_entries(pool: &SqlitePool, day_id: Uuid) -> Result<Vec<MealEntry>> {
    let entries = sqlx::query_as::<_, MealEntry>("SELECT * FROM meal_entries WHERE day_id = ?")
        .bind(day_id)
        .fetch_all(pool)
        .await
        .context("failed to list meal entries")?;

    Ok(entries)
}

/// Delete the entries of one meal day.
pub async fn delete_entries_for_day(pool: &SqlitePool, day_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM meal_entries WHERE day_id = ?")
        .bind(day_id)
        .execute(pool)
        .await
        .context("failed to delete meal entries")?;

    Ok(result.rows_affected())
}

/// Delete the entries of every meal day in a plan, in one statement.
pub async fn delete_entries_for_plan(pool: &SqlitePool, plan_id: i64) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM meal_entries \
         WHERE day_id IN (SELECT id FROM meal_days WHERE plan_id = ?)",
    )
    .bind(plan_id)
    .execute(pool)
    .await
    .context("failed to delete meal entries for plan")?;

    Ok(result.rows_affected())
}

/// Delete one meal day. Returns whether a row was removed.
pub async fn delete_day(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM meal_days WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete meal day")?;

    Ok(result.rows_affected() > 0)
}

/// Delete all meal days of a plan. Returns the number removed.
pub async fn delete_days_for_plan(pool: &SqlitePool, plan_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM meal_days WHERE plan_id = ?")
        .bind(plan_id)
        .execute(pool)
        .await
        .context("failed to delete meal days for plan")?;

    Ok(result.rows_affected())
}
