mod catalog_cmds;
mod config;
mod day_cmds;
mod plan_cmds;

use clap::{Args, Parser, Subcommand};

use fitplan_db::pool;

use config::FitplanConfig;

#[derive(Parser)]
#[command(name = "fitplan", about = "Personalized exercise and meal plan scheduler")]
struct Cli {
    /// Database URL (overrides FITPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a fitplan config file (no database required)
    Init {
        /// SQLite connection URL
        #[arg(long, default_value = "sqlite://fitplan.db")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the fitplan database (requires config file or env vars)
    DbInit,
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Per-day collection management
    Day {
        #[command(subcommand)]
        command: DayCommands,
    },
    /// Exercise and meal catalog management
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

/// Biometric profile flags shared by `plan preview` and `plan create`.
#[derive(Args)]
pub struct ProfileArgs {
    /// Current weight in kg
    #[arg(long)]
    pub weight: f64,
    /// Goal weight in kg
    #[arg(long)]
    pub goal_weight: f64,
    /// Height in cm
    #[arg(long)]
    pub height: f64,
    /// Age in years
    #[arg(long, default_value_t = 30)]
    pub age: u32,
    /// Gender: male, female, or other
    #[arg(long, default_value = "other")]
    pub gender: fitplan_core::calculator::Gender,
    /// Activity level: sedentary, lightly_active, moderately_active,
    /// very_active, or extra_active
    #[arg(long, default_value = "moderately_active")]
    pub activity: fitplan_core::calculator::ActivityLevel,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Compute plan parameters for a profile without persisting anything
    Preview {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Create a plan for a user, replacing any existing one
    Create {
        /// User ID the plan belongs to
        #[arg(long)]
        user: String,
        #[command(flatten)]
        profile: ProfileArgs,
        /// Override the calculator's plan length in days
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show a plan and its day collections (omit plan-id to list all plans)
    Show {
        /// Integer plan identifier (omit to list all)
        plan_id: Option<i64>,
        /// Emit the plan overview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a plan and everything it owns
    Delete {
        /// Integer plan identifier
        plan_id: i64,
    },
}

#[derive(Subcommand)]
pub enum DayCommands {
    /// Show one exercise day with its settings and entries
    ShowExercise {
        /// Exercise day ID
        day_id: String,
    },
    /// Update an exercise day's session parameters and entries
    UpdateExercise {
        /// Exercise day ID
        day_id: String,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Settings record to update-or-create (defaults to a fresh record)
        #[arg(long)]
        settings_id: Option<String>,
        /// Number of rounds
        #[arg(long)]
        round: Option<i64>,
        /// Seconds per exercise
        #[arg(long)]
        exercise_time: Option<i64>,
        /// Workouts per round
        #[arg(long)]
        workouts: Option<i64>,
        /// Comma-separated exercise IDs replacing the day's entry set
        #[arg(long)]
        exercises: Option<String>,
    },
    /// Delete one exercise day (frees its settings when unshared)
    DeleteExercise {
        /// Exercise day ID
        day_id: String,
    },
    /// Show one meal day with its entries
    ShowMeal {
        /// Meal day ID
        day_id: String,
    },
    /// Update a meal day's ratio and entries
    UpdateMeal {
        /// Meal day ID
        day_id: String,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Portion scaling ratio
        #[arg(long)]
        ratio: Option<f64>,
        /// Comma-separated meal IDs replacing the day's entry set
        #[arg(long)]
        meals: Option<String>,
    },
    /// Delete one meal day
    DeleteMeal {
        /// Meal day ID
        day_id: String,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Add an exercise to the catalog
    AddExercise {
        /// Exercise name
        name: String,
        /// Metabolic equivalent of task
        #[arg(long)]
        met: Option<f64>,
    },
    /// Add a meal to the catalog
    AddMeal {
        /// Meal name
        name: String,
        /// Calories per serving
        #[arg(long)]
        calories: Option<i64>,
        /// Comma-separated protein sources (e.g. "chicken,tofu")
        #[arg(long)]
        protein: Option<String>,
    },
    /// List the exercise and meal catalogs
    List,
}

/// Execute the `fitplan init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
    };
    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Next: run `fitplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `fitplan db-init` command: create the database file and run
/// migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = FitplanConfig::resolve(cli_db_url)?;

    println!("Initializing fitplan database...");

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("fitplan db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Plan { command } => {
            let resolved = FitplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_plan_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Day { command } => {
            let resolved = FitplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = day_cmds::run_day_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Catalog { command } => {
            let resolved = FitplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = catalog_cmds::run_catalog_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
