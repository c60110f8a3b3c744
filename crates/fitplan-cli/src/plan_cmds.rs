//! Operator CLI handlers for `fitplan plan` subcommands.
//!
//! Implements:
//! - `fitplan plan preview`          -- compute parameters without persisting
//! - `fitplan plan create`           -- create (or replace) a user's plan
//! - `fitplan plan show [plan-id]`   -- show plan details or list all plans
//! - `fitplan plan delete <plan-id>` -- cascade-delete a plan

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use fitplan_core::calculator::{DefaultCalculator, UserProfile};
use fitplan_core::plan::lifecycle::{self, PlanRequest};
use fitplan_db::queries::plans as plan_queries;

use crate::{PlanCommands, ProfileArgs};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, pool: &SqlitePool) -> Result<()> {
    match command {
        PlanCommands::Preview { profile } => cmd_preview(pool, &profile).await,
        PlanCommands::Create {
            user,
            profile,
            days,
        } => cmd_create(pool, &user, &profile, days).await,
        PlanCommands::Show { plan_id, json } => match plan_id {
            Some(id) => cmd_show_one(pool, id, json).await,
            None => cmd_show_all(pool).await,
        },
        PlanCommands::Delete { plan_id } => cmd_delete(pool, plan_id).await,
    }
}

fn profile_from_args(args: &ProfileArgs) -> UserProfile {
    UserProfile {
        current_weight_kg: Some(args.weight),
        goal_weight_kg: Some(args.goal_weight),
        current_height_cm: Some(args.height),
        age_years: Some(args.age),
        gender: args.gender,
        activity_level: args.activity,
    }
}

// -----------------------------------------------------------------------
// fitplan plan preview
// -----------------------------------------------------------------------

async fn cmd_preview(pool: &SqlitePool, args: &ProfileArgs) -> Result<()> {
    let calculator = DefaultCalculator::new(pool.clone());
    let preview = lifecycle::preview_plan(pool, &calculator, &profile_from_args(args)).await?;

    let p = &preview.parameters;
    println!("Plan preview:");
    println!();
    println!("  Length:          {} days", p.plan_length_in_days);
    println!("  Daily goal:      {} kcal", p.daily_goal_calories);
    println!("  Daily intake:    {} kcal", p.daily_intake_calories);
    println!("  Daily outtake:   {} kcal", p.daily_outtake_calories);
    println!("  Start:           {}", p.start_date.format("%Y-%m-%d"));
    println!("  End:             {}", p.end_date.format("%Y-%m-%d"));
    println!();

    println!("Candidate exercises ({}):", preview.exercises.len());
    for exercise in &preview.exercises {
        match exercise.met_value {
            Some(met) => println!("  {}  (MET {met})", exercise.name),
            None => println!("  {}", exercise.name),
        }
    }
    println!();
    println!("Candidate meals ({}):", preview.meals.len());
    for meal in &preview.meals {
        match meal.calories {
            Some(kcal) => println!("  {}  ({kcal} kcal)", meal.name),
            None => println!("  {}", meal.name),
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------
// fitplan plan create
// -----------------------------------------------------------------------

async fn cmd_create(
    pool: &SqlitePool,
    user: &str,
    args: &ProfileArgs,
    days_override: Option<u32>,
) -> Result<()> {
    let user_id = Uuid::parse_str(user).with_context(|| format!("invalid user ID: {user}"))?;

    let calculator = DefaultCalculator::new(pool.clone());
    let preview = lifecycle::preview_plan(pool, &calculator, &profile_from_args(args)).await?;

    let mut request = PlanRequest::from(preview.parameters);
    if let Some(days) = days_override {
        request.plan_length_in_days = days;
        request.end_date = None;
    }

    let created = lifecycle::create_plan(pool, user_id, &request).await?;

    println!("Plan created successfully.");
    println!();
    println!("  Plan ID:        {}", created.plan.plan_id);
    println!("  User:           {}", created.plan.user_id);
    println!("  Daily goal:     {} kcal", created.plan.daily_goal_calories);
    println!(
        "  Span:           {} .. {}",
        created.plan.start_date.format("%Y-%m-%d"),
        created.plan.end_date.format("%Y-%m-%d")
    );
    println!("  Exercise days:  {}", created.exercise_days_created);
    println!("  Meal days:      {}", created.meal_days_created);

    Ok(())
}

// -----------------------------------------------------------------------
// fitplan plan show (list all)
// -----------------------------------------------------------------------

async fn cmd_show_all(pool: &SqlitePool) -> Result<()> {
    let plans = plan_queries::list_plans(pool).await?;

    if plans.is_empty() {
        println!("No plans found. Use `fitplan plan create` to create one.");
        return Ok(());
    }

    println!("{:<8} {:<36} {:<12} {:<12} GOAL", "PLAN", "USER", "START", "END");
    for plan in &plans {
        println!(
            "{:<8} {:<36} {:<12} {:<12} {}",
            plan.plan_id,
            plan.user_id,
            plan.start_date.format("%Y-%m-%d"),
            plan.end_date.format("%Y-%m-%d"),
            plan.daily_goal_calories,
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// fitplan plan show <plan-id>
// -----------------------------------------------------------------------

async fn cmd_show_one(pool: &SqlitePool, plan_id: i64, json: bool) -> Result<()> {
    let overview = lifecycle::get_plan_overview(pool, plan_id).await?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&overview).context("failed to serialize plan overview")?;
        println!("{rendered}");
        return Ok(());
    }

    let plan = &overview.plan;
    println!("Plan {}", plan.plan_id);
    println!("  User:        {}", plan.user_id);
    println!("  Daily goal:  {} kcal", plan.daily_goal_calories);
    println!(
        "  Span:        {} .. {}",
        plan.start_date.format("%Y-%m-%d"),
        plan.end_date.format("%Y-%m-%d")
    );
    println!();

    println!("Exercise days ({}):", overview.exercise_days.len());
    for detail in &overview.exercise_days {
        let rounds = detail
            .settings
            .as_ref()
            .map(|s| format!("{} rounds", s.round))
            .unwrap_or_else(|| "no settings".to_string());
        println!(
            "  {}  {}  {} exercises, {}",
            detail.day.date.format("%Y-%m-%d"),
            detail.day.id,
            detail.entries.len(),
            rounds,
        );
    }
    println!();

    println!("Meal days ({}):", overview.meal_days.len());
    for detail in &overview.meal_days {
        println!(
            "  {}  {}  {} meals, ratio {}",
            detail.day.date.format("%Y-%m-%d"),
            detail.day.id,
            detail.entries.len(),
            detail.day.meal_ratio,
        );
    }

    Ok(())
}

// -----------------------------------------------------------------------
// fitplan plan delete <plan-id>
// -----------------------------------------------------------------------

async fn cmd_delete(pool: &SqlitePool, plan_id: i64) -> Result<()> {
    let deletion = lifecycle::delete_plan(pool, plan_id).await?;

    println!(
        "Plan {plan_id} deleted: {} exercise days, {} meal days.",
        deletion.exercise_days_deleted, deletion.meal_days_deleted
    );

    Ok(())
}
