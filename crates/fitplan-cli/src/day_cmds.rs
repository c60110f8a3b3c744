//! Operator CLI handlers for `fitplan day` subcommands: per-day reads,
//! updates, and deletes for both collection kinds.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use fitplan_core::plan::lifecycle::{
    self, ExerciseDayUpdate, MealDayUpdate,
};
use fitplan_core::plan::session::SessionSpec;

use crate::DayCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `DayCommands` variant to the appropriate handler.
pub async fn run_day_command(command: DayCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        DayCommands::ShowExercise { day_id } => cmd_show_exercise(pool, &day_id).await,
        DayCommands::UpdateExercise {
            day_id,
            date,
            settings_id,
            round,
            exercise_time,
            workouts,
            exercises,
        } => {
            let update = ExerciseDayUpdate {
                date: date.as_deref().map(parse_date).transpose()?,
                plan_id: None,
                session: SessionSpec {
                    settings_id: settings_id.as_deref().map(parse_id).transpose()?,
                    round,
                    exercise_time,
                    num_of_workouts_per_round: workouts,
                },
                exercise_ids: exercises.as_deref().map(parse_id_list).transpose()?,
            };
            cmd_update_exercise(pool, &day_id, &update).await
        }
        DayCommands::DeleteExercise { day_id } => cmd_delete_exercise(pool, &day_id).await,
        DayCommands::ShowMeal { day_id } => cmd_show_meal(pool, &day_id).await,
        DayCommands::UpdateMeal {
            day_id,
            date,
            ratio,
            meals,
        } => {
            let update = MealDayUpdate {
                date: date.as_deref().map(parse_date).transpose()?,
                plan_id: None,
                meal_ratio: ratio,
                meal_ids: meals.as_deref().map(parse_id_list).transpose()?,
            };
            cmd_update_meal(pool, &day_id, &update).await
        }
        DayCommands::DeleteMeal { day_id } => cmd_delete_meal(pool, &day_id).await,
    }
}

// -----------------------------------------------------------------------
// Argument parsing
// -----------------------------------------------------------------------

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid ID: {raw}"))
}

/// Parse a `YYYY-MM-DD` date into a midnight UTC timestamp.
fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {raw}"))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn parse_id_list(raw: &str) -> Result<Vec<Uuid>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_id)
        .collect()
}

// -----------------------------------------------------------------------
// Exercise days
// -----------------------------------------------------------------------

async fn cmd_show_exercise(pool: &SqlitePool, day_id: &str) -> Result<()> {
    let detail = lifecycle::get_exercise_day(pool, parse_id(day_id)?).await?;

    println!("Exercise day {}", detail.day.id);
    println!("  Date:     {}", detail.day.date.format("%Y-%m-%d"));
    println!("  Plan:     {}", detail.day.plan_id);
    match &detail.settings {
        Some(s) => {
            println!("  Settings: {}", s.id);
            println!(
                "    {} rounds x {} workouts, {}s each, {}s transition",
                s.round, s.num_of_workouts_per_round, s.exercise_time, s.transition_time
            );
            println!(
                "    rest {}s every {} workouts",
                s.rest_time, s.rest_frequency
            );
        }
        None => println!("  Settings: (missing)"),
    }
    println!("  Entries ({}):", detail.entries.len());
    for entry in &detail.entries {
        println!("    {}", entry.exercise_id);
    }

    Ok(())
}

async fn cmd_update_exercise(
    pool: &SqlitePool,
    day_id: &str,
    update: &ExerciseDayUpdate,
) -> Result<()> {
    let detail = lifecycle::update_exercise_day(pool, parse_id(day_id)?, update).await?;

    println!(
        "Exercise day {} updated: {} entries.",
        detail.day.id,
        detail.entries.len()
    );
    Ok(())
}

async fn cmd_delete_exercise(pool: &SqlitePool, day_id: &str) -> Result<()> {
    lifecycle::delete_exercise_day(pool, parse_id(day_id)?).await?;
    println!("Exercise day {day_id} deleted.");
    Ok(())
}

// -----------------------------------------------------------------------
// Meal days
// -----------------------------------------------------------------------

async fn cmd_show_meal(pool: &SqlitePool, day_id: &str) -> Result<()> {
    let detail = lifecycle::get_meal_day(pool, parse_id(day_id)?).await?;

    println!("Meal day {}", detail.day.id);
    println!("  Date:   {}", detail.day.date.format("%Y-%m-%d"));
    println!("  Plan:   {}", detail.day.plan_id);
    println!("  Ratio:  {}", detail.day.meal_ratio);
    println!("  Entries ({}):", detail.entries.len());
    for entry in &detail.entries {
        println!("    {}", entry.meal_id);
    }

    Ok(())
}

async fn cmd_update_meal(pool: &SqlitePool, day_id: &str, update: &MealDayUpdate) -> Result<()> {
    let detail = lifecycle::update_meal_day(pool, parse_id(day_id)?, update).await?;

    println!(
        "Meal day {} updated: ratio {}, {} entries.",
        detail.day.id,
        detail.day.meal_ratio,
        detail.entries.len()
    );
    Ok(())
}

async fn cmd_delete_meal(pool: &SqlitePool, day_id: &str) -> Result<()> {
    lifecycle::delete_meal_day(pool, parse_id(day_id)?).await?;
    println!("Meal day {day_id} deleted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_is_midnight_utc() {
        let dt = parse_date("2026-03-05").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-05T00:00:00+00:00");
        assert!(parse_date("03/05/2026").is_err());
    }

    #[test]
    fn parse_id_list_trims_and_skips_empties() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!(" {a} , {b} ,");
        let parsed = parse_id_list(&raw).unwrap();
        assert_eq!(parsed, vec![a, b]);

        assert!(parse_id_list("not-a-uuid").is_err());
    }
}
