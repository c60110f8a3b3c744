//! Operator CLI handlers for `fitplan catalog` subcommands.

use anyhow::Result;
use sqlx::SqlitePool;

use fitplan_db::queries::catalog;

use crate::CatalogCommands;

/// Dispatch a `CatalogCommands` variant to the appropriate handler.
pub async fn run_catalog_command(command: CatalogCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        CatalogCommands::AddExercise { name, met } => cmd_add_exercise(pool, &name, met).await,
        CatalogCommands::AddMeal {
            name,
            calories,
            protein,
        } => cmd_add_meal(pool, &name, calories, protein.as_deref()).await,
        CatalogCommands::List => cmd_list(pool).await,
    }
}

async fn cmd_add_exercise(pool: &SqlitePool, name: &str, met: Option<f64>) -> Result<()> {
    let exercise = catalog::insert_exercise(pool, name, met).await?;
    println!("Exercise added: {} ({})", exercise.name, exercise.id);
    Ok(())
}

async fn cmd_add_meal(
    pool: &SqlitePool,
    name: &str,
    calories: Option<i64>,
    protein: Option<&str>,
) -> Result<()> {
    let sources: Vec<String> = protein
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    let meal = catalog::insert_meal(pool, name, calories, &sources).await?;
    println!("Meal added: {} ({})", meal.name, meal.id);
    Ok(())
}

async fn cmd_list(pool: &SqlitePool) -> Result<()> {
    let exercises = catalog::list_exercises(pool).await?;
    let meals = catalog::list_meals(pool).await?;

    println!("Exercises ({}):", exercises.len());
    for exercise in &exercises {
        match exercise.met_value {
            Some(met) => println!("  {}  {}  (MET {met})", exercise.id, exercise.name),
            None => println!("  {}  {}", exercise.id, exercise.name),
        }
    }
    println!();

    println!("Meals ({}):", meals.len());
    for meal in &meals {
        let kcal = meal
            .calories
            .map(|c| format!("{c} kcal"))
            .unwrap_or_else(|| "? kcal".to_string());
        if meal.protein_sources.0.is_empty() {
            println!("  {}  {}  ({kcal})", meal.id, meal.name);
        } else {
            println!(
                "  {}  {}  ({kcal}, protein: {})",
                meal.id,
                meal.name,
                meal.protein_sources.0.join(", ")
            );
        }
    }

    Ok(())
}
