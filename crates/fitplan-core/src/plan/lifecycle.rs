//! Plan lifecycle orchestration.
//!
//! Whole-plan creation replaces any existing plan for the user, then folds
//! over the day series in ascending date order: each day's exercise session
//! is built first, its intensity feeds that day's meal selection, and the
//! chosen meal ids carry forward as the next day's exclusion set. Because of
//! that carried state, days are processed strictly sequentially.
//!
//! Deletion cascades entries before collections before settings, so the
//! settings reference scans are accurate at deletion time. No transaction
//! wraps a whole plan build: a failure at day k leaves days 0..k-1 persisted
//! under the new plan id, and callers recover with [`delete_plan`].

use std::collections::HashSet;

use chrono::{DateTime, Days, Utc};
use futures::future::try_join_all;
use sqlx::SqlitePool;
use uuid::Uuid;

use fitplan_db::models::{
    Exercise, ExerciseDay, ExerciseEntry, Meal, MealDay, MealEntry, Plan, SessionSettings,
};
use fitplan_db::queries::{catalog, exercise_days, meal_days, plans, settings};

use crate::calculator::{PlanCalculator, PlanParameters, UserProfile};
use crate::error::PlanError;
use crate::plan::day_series::day_series;
use crate::plan::session::{self, SessionSpec};
use crate::plan::meals;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Parameters for a whole-plan creation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanRequest {
    pub plan_length_in_days: u32,
    pub daily_goal_calories: i64,
    pub daily_intake_calories: i64,
    pub daily_outtake_calories: i64,
    pub recommended_exercise_ids: Vec<Uuid>,
    pub recommended_meal_ids: Vec<Uuid>,
    /// Defaults to now.
    pub start_date: Option<DateTime<Utc>>,
    /// Defaults to `start_date + plan_length_in_days`, which may exceed the
    /// materialized day span for long plans.
    pub end_date: Option<DateTime<Utc>>,
}

impl PlanRequest {
    fn validate(&self) -> Result<(), PlanError> {
        if self.plan_length_in_days == 0 {
            return Err(PlanError::invalid_input(
                "plan_length_in_days must be at least 1",
            ));
        }
        if self.daily_goal_calories <= 0 {
            return Err(PlanError::invalid_input(
                "daily_goal_calories must be positive",
            ));
        }
        Ok(())
    }
}

impl From<PlanParameters> for PlanRequest {
    fn from(parameters: PlanParameters) -> Self {
        Self {
            plan_length_in_days: parameters.plan_length_in_days,
            daily_goal_calories: parameters.daily_goal_calories,
            daily_intake_calories: parameters.daily_intake_calories,
            daily_outtake_calories: parameters.daily_outtake_calories,
            recommended_exercise_ids: parameters.recommended_exercise_ids,
            recommended_meal_ids: parameters.recommended_meal_ids,
            start_date: Some(parameters.start_date),
            end_date: Some(parameters.end_date),
        }
    }
}

/// Result of a whole-plan creation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CreatedPlan {
    pub plan: Plan,
    pub exercise_days_created: usize,
    pub meal_days_created: usize,
}

/// Counts reported by a cascaded plan deletion.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct PlanDeletion {
    pub exercise_days_deleted: u64,
    pub meal_days_deleted: u64,
}

/// Read-only preview of what a plan creation would use: the calculator's
/// parameters enriched with the matching catalog records. No persistence.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlanPreview {
    pub parameters: PlanParameters,
    pub exercises: Vec<Exercise>,
    pub meals: Vec<Meal>,
}

/// An exercise day with its entries and, best-effort, its settings record.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExerciseDayDetail {
    pub day: ExerciseDay,
    /// `None` when the referenced settings record is missing; reads stay
    /// usable without it.
    pub settings: Option<SessionSettings>,
    pub entries: Vec<ExerciseEntry>,
}

/// A meal day with its entries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MealDayDetail {
    pub day: MealDay,
    pub entries: Vec<MealEntry>,
}

/// Caller-supplied changes for one exercise day. `None` leaves a field
/// unchanged; an absent `exercise_ids` list leaves the entry set untouched.
#[derive(Debug, Clone, Default)]
pub struct ExerciseDayUpdate {
    pub date: Option<DateTime<Utc>>,
    pub plan_id: Option<i64>,
    pub session: SessionSpec,
    pub exercise_ids: Option<Vec<Uuid>>,
}

/// Caller-supplied changes for one meal day.
#[derive(Debug, Clone, Default)]
pub struct MealDayUpdate {
    pub date: Option<DateTime<Utc>>,
    pub plan_id: Option<i64>,
    pub meal_ratio: Option<f64>,
    pub meal_ids: Option<Vec<Uuid>>,
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// Run the calculator against a profile and enrich the result with catalog
/// records, without persisting anything.
///
/// Refuses incomplete profiles: current weight, goal weight, and height must
/// all be present before the calculator is consulted.
pub async fn preview_plan(
    pool: &SqlitePool,
    calculator: &dyn PlanCalculator,
    profile: &UserProfile,
) -> Result<PlanPreview, PlanError> {
    if !profile.is_complete() {
        return Err(PlanError::invalid_input(
            "missing required profile fields: current_weight, goal_weight, and current_height",
        ));
    }

    let parameters = calculator
        .generate_plan(profile)
        .await
        .map_err(PlanError::Upstream)?;

    let exercises = catalog::exercises_by_ids(pool, &parameters.recommended_exercise_ids).await?;
    let meals = catalog::meals_by_ids(pool, &parameters.recommended_meal_ids).await?;

    Ok(PlanPreview {
        parameters,
        exercises,
        meals,
    })
}

// ---------------------------------------------------------------------------
// Create / replace
// ---------------------------------------------------------------------------

/// Create a plan for a user, replacing any existing one.
///
/// Replace is destroy-then-recreate: the old plan and all its dependents go
/// first, never a partial merge. The new integer plan id is
/// `1 + max(existing)`; day collections are then built sequentially in date
/// order, threading the previous day's meal ids into each day's selection.
pub async fn create_plan(
    pool: &SqlitePool,
    user_id: Uuid,
    request: &PlanRequest,
) -> Result<CreatedPlan, PlanError> {
    request.validate()?;

    if let Some(existing) = plans::find_plan_for_user(pool, user_id).await? {
        tracing::info!(
            user_id = %user_id,
            plan_id = existing.plan_id,
            "replacing existing plan"
        );
        delete_plan(pool, existing.plan_id).await?;
    }

    let plan_id = plans::next_plan_id(pool).await?;
    let start_date = request.start_date.unwrap_or_else(Utc::now);
    let end_date = request.end_date.unwrap_or_else(|| {
        start_date
            .checked_add_days(Days::new(u64::from(request.plan_length_in_days)))
            .unwrap_or(start_date)
    });

    let plan = plans::insert_plan(
        pool,
        user_id,
        plan_id,
        request.daily_goal_calories,
        start_date,
        end_date,
    )
    .await?;

    // Candidate meals are fixed for the whole plan; fetch them once.
    let candidates = catalog::meals_by_ids(pool, &request.recommended_meal_ids).await?;

    let mut previous_meals: HashSet<Uuid> = HashSet::new();
    let mut exercise_days_created = 0;
    let mut meal_days_created = 0;

    for date in day_series(start_date, request.plan_length_in_days) {
        let (_, chosen_exercises) = session::build_exercise_day(
            pool,
            date,
            plan_id,
            &SessionSpec::default(),
            &request.recommended_exercise_ids,
        )
        .await?;
        exercise_days_created += 1;

        let day_exercises = catalog::exercises_by_ids(pool, &chosen_exercises).await?;
        let (_, chosen_meals) = meals::build_meal_day(
            pool,
            date,
            plan_id,
            request.daily_intake_calories,
            &day_exercises,
            &candidates,
            &previous_meals,
        )
        .await?;
        meal_days_created += 1;

        previous_meals = chosen_meals.into_iter().collect();
    }

    tracing::info!(
        user_id = %user_id,
        plan_id,
        days = exercise_days_created,
        "plan created"
    );

    Ok(CreatedPlan {
        plan,
        exercise_days_created,
        meal_days_created,
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetch one exercise day with its entries and settings.
///
/// The settings lookup is best-effort: a missing record leaves `settings`
/// as `None` rather than failing the read.
pub async fn get_exercise_day(
    pool: &SqlitePool,
    day_id: Uuid,
) -> Result<ExerciseDayDetail, PlanError> {
    let day = exercise_days::get_day(pool, day_id)
        .await?
        .ok_or_else(|| PlanError::not_found(format!("exercise day {day_id}")))?;

    let settings = settings::get_settings(pool, day.settings_id).await?;
    let entries = exercise_days::list_entries(pool, day_id).await?;

    Ok(ExerciseDayDetail {
        day,
        settings,
        entries,
    })
}

/// Fetch one meal day with its entries.
pub async fn get_meal_day(pool: &SqlitePool, day_id: Uuid) -> Result<MealDayDetail, PlanError> {
    let day = meal_days::get_day(pool, day_id)
        .await?
        .ok_or_else(|| PlanError::not_found(format!("meal day {day_id}")))?;

    let entries = meal_days::list_entries(pool, day_id).await?;

    Ok(MealDayDetail { day, entries })
}

/// A plan with all its day collections, in date order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlanOverview {
    pub plan: Plan,
    pub exercise_days: Vec<ExerciseDayDetail>,
    pub meal_days: Vec<MealDayDetail>,
}

/// Fetch a plan and all its day collections by integer plan id.
pub async fn get_plan_overview(pool: &SqlitePool, plan_id: i64) -> Result<PlanOverview, PlanError> {
    let plan = plans::find_plan_by_plan_id(pool, plan_id)
        .await?
        .ok_or_else(|| PlanError::not_found(format!("plan {plan_id}")))?;

    let mut exercise_day_details = Vec::new();
    for day in exercise_days::list_days_for_plan(pool, plan_id).await? {
        let settings = settings::get_settings(pool, day.settings_id).await?;
        let entries = exercise_days::list_entries(pool, day.id).await?;
        exercise_day_details.push(ExerciseDayDetail {
            day,
            settings,
            entries,
        });
    }

    let mut meal_day_details = Vec::new();
    for day in meal_days::list_days_for_plan(pool, plan_id).await? {
        let entries = meal_days::list_entries(pool, day.id).await?;
        meal_day_details.push(MealDayDetail { day, entries });
    }

    Ok(PlanOverview {
        plan,
        exercise_days: exercise_day_details,
        meal_days: meal_day_details,
    })
}

// ---------------------------------------------------------------------------
// Single-collection update
// ---------------------------------------------------------------------------

/// Update one exercise day: own fields, settings resolution, and (when an
/// id list is supplied) full replacement of the entry set.
pub async fn update_exercise_day(
    pool: &SqlitePool,
    day_id: Uuid,
    update: &ExerciseDayUpdate,
) -> Result<ExerciseDayDetail, PlanError> {
    let day = exercise_days::get_day(pool, day_id)
        .await?
        .ok_or_else(|| PlanError::not_found(format!("exercise day {day_id}")))?;

    let resolved = session::resolve_settings(pool, &update.session).await?;
    let day =
        exercise_days::update_day(pool, day.id, update.date, update.plan_id, resolved.id).await?;

    if let Some(ids) = &update.exercise_ids {
        exercise_days::replace_entries(pool, day.id, ids).await?;
    }

    let entries = exercise_days::list_entries(pool, day.id).await?;
    Ok(ExerciseDayDetail {
        day,
        settings: Some(resolved),
        entries,
    })
}

/// Update one meal day: own fields and (when an id list is supplied) full
/// replacement of the entry set.
pub async fn update_meal_day(
    pool: &SqlitePool,
    day_id: Uuid,
    update: &MealDayUpdate,
) -> Result<MealDayDetail, PlanError> {
    let day = meal_days::get_day(pool, day_id)
        .await?
        .ok_or_else(|| PlanError::not_found(format!("meal day {day_id}")))?;

    let day = meal_days::update_day(
        pool,
        day.id,
        update.date,
        update.plan_id,
        update.meal_ratio,
    )
    .await?;

    if let Some(ids) = &update.meal_ids {
        meal_days::replace_entries(pool, day.id, ids).await?;
    }

    let entries = meal_days::list_entries(pool, day.id).await?;
    Ok(MealDayDetail { day, entries })
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// Delete one exercise day: its entries, then its settings record when no
/// other day references it, then the day itself.
pub async fn delete_exercise_day(pool: &SqlitePool, day_id: Uuid) -> Result<(), PlanError> {
    let day = exercise_days::get_day(pool, day_id)
        .await?
        .ok_or_else(|| PlanError::not_found(format!("exercise day {day_id}")))?;

    exercise_days::delete_entries_for_day(pool, day.id).await?;

    let other_refs =
        settings::count_referencing_days_excluding(pool, day.settings_id, day.id).await?;
    if other_refs == 0 {
        settings::delete_settings(pool, day.settings_id).await?;
    }

    exercise_days::delete_day(pool, day.id).await?;
    Ok(())
}

/// Delete one meal day and its entries.
pub async fn delete_meal_day(pool: &SqlitePool, day_id: Uuid) -> Result<(), PlanError> {
    let day = meal_days::get_day(pool, day_id)
        .await?
        .ok_or_else(|| PlanError::not_found(format!("meal day {day_id}")))?;

    meal_days::delete_entries_for_day(pool, day.id).await?;
    meal_days::delete_day(pool, day.id).await?;
    Ok(())
}

/// Delete every day collection belonging to a plan id, cascading entries
/// and orphaned settings. Zero matching collections is a no-op success.
///
/// Entries go first (one statement per side), then each distinct settings
/// record is checked for references *outside* this plan -- the plan's own
/// days are about to go -- with the checks issued concurrently and awaited
/// together. Collections are removed last.
pub async fn delete_collections_for_plan(
    pool: &SqlitePool,
    plan_id: i64,
) -> Result<PlanDeletion, PlanError> {
    let settings_ids = exercise_days::distinct_settings_for_plan(pool, plan_id).await?;

    exercise_days::delete_entries_for_plan(pool, plan_id).await?;
    meal_days::delete_entries_for_plan(pool, plan_id).await?;

    let checks = settings_ids.iter().map(|settings_id| {
        let settings_id = *settings_id;
        async move {
            let refs =
                settings::count_referencing_days_outside_plan(pool, settings_id, plan_id).await?;
            if refs == 0 {
                // Idempotent delete: a concurrent cascade may have beaten us
                // to this record.
                settings::delete_settings(pool, settings_id).await?;
            }
            anyhow::Ok(())
        }
    });
    try_join_all(checks).await?;

    let exercise_days_deleted = exercise_days::delete_days_for_plan(pool, plan_id).await?;
    let meal_days_deleted = meal_days::delete_days_for_plan(pool, plan_id).await?;

    tracing::info!(
        plan_id,
        exercise_days_deleted,
        meal_days_deleted,
        "deleted plan collections"
    );

    Ok(PlanDeletion {
        exercise_days_deleted,
        meal_days_deleted,
    })
}

/// Delete a plan by integer identifier: all its collections (cascaded), then
/// the plan row itself. Succeeds as a no-op when nothing matches.
pub async fn delete_plan(pool: &SqlitePool, plan_id: i64) -> Result<PlanDeletion, PlanError> {
    let deletion = delete_collections_for_plan(pool, plan_id).await?;
    plans::delete_plans_by_plan_id(pool, plan_id).await?;
    Ok(deletion)
}
