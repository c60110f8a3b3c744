//! Read access to the exercise and meal catalog, plus the minimal write
//! surface needed to seed it.

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{Exercise, Meal};

/// Insert a catalog exercise.
pub async fn insert_exercise(
    pool: &SqlitePool,
    name: &str,
    met_value: Option<f64>,
) -> Result<Exercise> {
    let exercise = sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises (id, name, met_value) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(met_value)
    .fetch_one(pool)
    .await
    .context("failed to insert exercise")?;

    Ok(exercise)
}

/// Insert a catalog meal.
pub async fn insert_meal(
    pool: &SqlitePool,
    name: &str,
    calories: Option<i64>,
    protein_sources: &[String],
) -> Result<Meal> {
    let meal = sqlx::query_as::<_, Meal>(
        "INSERT INTO meals (id, name, calories, protein_sources) \
         VALUES (?, ?, ?, ?) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(calories)
    .bind(Json(protein_sources.to_vec()))
    .fetch_one(pool)
    .await
    .context("failed to insert meal")?;

    Ok(meal)
}

/// Fetch the exercises matching an id set. Unknown ids are silently absent
/// from the result.
pub async fn exercises_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Exercise>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM exercises WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    builder.push(")");

    let exercises = builder
        .build_query_as::<Exercise>()
        .fetch_all(pool)
        .await
        .context("failed to fetch exercises by ids")?;

    Ok(exercises)
}

/// Fetch the meals matching an id set. Unknown ids are silently absent from
/// the result.
pub async fn meals_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<Vec<Meal>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM meals WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    builder.push(")");

    let meals = builder
        .build_query_as::<Meal>()
        .fetch_all(pool)
        .await
        .context("failed to fetch meals by ids")?;

    Ok(meals)
}

/// List the whole exercise catalog, sorted by name.
pub async fn list_exercises(pool: &SqlitePool) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>("SELECT * FROM exercises ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list exercises")?;

    Ok(exercises)
}

/// List the whole meal catalog, sorted by name.
pub async fn list_meals(pool: &SqlitePool) -> Result<Vec<Meal>> {
    let meals = sqlx::query_as::<_, Meal>("SELECT * FROM meals ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list meals")?;

    Ok(meals)
}
