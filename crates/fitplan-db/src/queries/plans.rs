//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Plan;

/// Insert a new plan row.
pub async fn insert_plan(
    pool: &SqlitePool,
    user_id: Uuid,
    plan_id: i64,
    daily_goal_calories: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<Plan> {
    let plan = sqlx::query_as::<_, Plan>(
        "INSERT INTO plans (id, user_id, plan_id, daily_goal_calories, start_date, end_date, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(plan_id)
    .bind(daily_goal_calories)
    .bind(start_date)
    .bind(end_date)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .context("failed to insert plan")?;

    Ok(plan)
}

/// Fetch the plan owned by a user, if any. The schema allows at most one.
pub async fn find_plan_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE user_id = ? LIMIT 1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan for user")?;

    Ok(plan)
}

/// Fetch a plan by its outward-facing integer identifier.
pub async fn find_plan_by_plan_id(pool: &SqlitePool, plan_id: i64) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE plan_id = ? LIMIT 1")
        .bind(plan_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan by plan_id")?;

    Ok(plan)
}

/// List all plans, newest first.
pub async fn list_plans(pool: &SqlitePool) -> Result<Vec<Plan>> {
    let plans = sqlx::query_as::<_, Plan>("SELECT * FROM plans ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to list plans")?;

    Ok(plans)
}

/// The next free integer plan identifier: `1 + max(plan_id)` across all
/// plans, 1 when none exist.
///
/// This is a max-scan, not an atomic sequence; two concurrent creations can
/// race to the same identifier. Documented and accepted, see DESIGN.md.
pub async fn next_plan_id(pool: &SqlitePool) -> Result<i64> {
    let (next,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(plan_id), 0) + 1 FROM plans")
        .fetch_one(pool)
        .await
        .context("failed to compute next plan_id")?;

    Ok(next)
}

/// Delete every plan row carrying the given integer identifier. Returns the
/// number of rows removed; zero is not an error.
pub async fn delete_plans_by_plan_id(pool: &SqlitePool, plan_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM plans WHERE plan_id = ?")
        .bind(plan_id)
        .execute(pool)
        .await
        .context("failed to delete plans by plan_id")?;

    Ok(result.rows_affected())
}
