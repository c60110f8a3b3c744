//! Shared test utilities for fitplan integration tests.
//!
//! Each test gets its own in-memory SQLite database with migrations applied.
//! The pool is pinned to a single connection because every `:memory:`
//! connection is a separate database.

use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use fitplan_db::models::{Exercise, Meal};
use fitplan_db::pool;
use fitplan_db::queries::catalog;

/// Create a fresh in-memory database with migrations applied.
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");

    pool::run_migrations(&pool)
        .await
        .expect("migrations should succeed");

    pool
}

/// Seed one catalog exercise and return it.
pub async fn seed_exercise(pool: &SqlitePool, name: &str, met_value: Option<f64>) -> Exercise {
    catalog::insert_exercise(pool, name, met_value)
        .await
        .expect("failed to seed exercise")
}

/// Seed one catalog meal and return it.
pub async fn seed_meal(
    pool: &SqlitePool,
    name: &str,
    calories: Option<i64>,
    protein_sources: &[&str],
) -> Meal {
    let sources: Vec<String> = protein_sources.iter().map(|s| s.to_string()).collect();
    catalog::insert_meal(pool, name, calories, &sources)
        .await
        .expect("failed to seed meal")
}

/// Seed `n_exercises` exercises and `n_meals` meals with varied attributes.
///
/// Exercises alternate between moderate and high MET values; meals spread
/// over a range of calorie values, every third one carrying a protein
/// source. Returns the seeded id sets.
pub async fn seed_catalog(
    pool: &SqlitePool,
    n_exercises: usize,
    n_meals: usize,
) -> (Vec<Uuid>, Vec<Uuid>) {
    let mut exercise_ids = Vec::with_capacity(n_exercises);
    for i in 0..n_exercises {
        let met = if i % 2 == 0 { 4.0 } else { 7.5 };
        let ex = seed_exercise(pool, &format!("exercise-{i}"), Some(met)).await;
        exercise_ids.push(ex.id);
    }

    let mut meal_ids = Vec::with_capacity(n_meals);
    for i in 0..n_meals {
        let calories = 300 + (i as i64 % 6) * 100;
        let protein: &[&str] = if i % 3 == 0 { &["chicken"] } else { &[] };
        let meal = seed_meal(pool, &format!("meal-{i}"), Some(calories), protein).await;
        meal_ids.push(meal.id);
    }

    (exercise_ids, meal_ids)
}
