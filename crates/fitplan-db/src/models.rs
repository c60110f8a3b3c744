use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A plan -- one user's active multi-day schedule.
///
/// `plan_id` is the outward-facing integer identifier, globally monotonic and
/// never reused; `id` is the storage identifier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: i64,
    pub daily_goal_calories: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Session configuration for an exercise day.
///
/// May be referenced by more than one exercise day; rows are removed only
/// once no day references them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SessionSettings {
    pub id: Uuid,
    pub round: i64,
    pub num_of_workouts_per_round: i64,
    pub is_start_with_warm_up: bool,
    pub is_shuffle: bool,
    pub exercise_time: i64,
    pub transition_time: i64,
    pub rest_time: i64,
    pub rest_frequency: i64,
    pub created_at: DateTime<Utc>,
}

impl SessionSettings {
    pub const DEFAULT_ROUND: i64 = 3;
    pub const DEFAULT_WORKOUTS_PER_ROUND: i64 = 10;
    pub const DEFAULT_EXERCISE_TIME: i64 = 45;
    pub const DEFAULT_TRANSITION_TIME: i64 = 10;
    pub const DEFAULT_REST_TIME: i64 = 10;
    pub const DEFAULT_REST_FREQUENCY: i64 = 10;
}

/// One calendar day's exercise session within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExerciseDay {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub plan_id: i64,
    pub settings_id: Uuid,
}

/// A single exercise placed into a day's session. Created and destroyed with
/// its owning day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExerciseEntry {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub day_id: Uuid,
}

/// One calendar day's meal set within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealDay {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub plan_id: i64,
    pub meal_ratio: f64,
}

/// A single meal placed into a day's meal set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealEntry {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub day_id: Uuid,
}

// ---------------------------------------------------------------------------
// Catalog rows
// ---------------------------------------------------------------------------

/// A catalog exercise. Read-only from the scheduler's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub met_value: Option<f64>,
}

impl Exercise {
    /// MET value assumed for exercises missing one.
    pub const DEFAULT_MET: f64 = 5.0;

    /// The metabolic intensity of this exercise, defaulted when absent.
    pub fn met(&self) -> f64 {
        self.met_value.unwrap_or(Self::DEFAULT_MET)
    }
}

/// A catalog meal. Read-only from the scheduler's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub calories: Option<i64>,
    pub protein_sources: Json<Vec<String>>,
}

impl Meal {
    /// Calorie value assumed for meals missing one.
    pub const DEFAULT_CALORIES: i64 = 500;

    /// The calorie value of this meal, defaulted when absent.
    pub fn calories_or_default(&self) -> i64 {
        self.calories.unwrap_or(Self::DEFAULT_CALORIES)
    }

    /// Whether this meal carries at least one protein source.
    pub fn has_protein_source(&self) -> bool {
        !self.protein_sources.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn meal(calories: Option<i64>, protein: &[&str]) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            name: "test".to_owned(),
            calories,
            protein_sources: Json(protein.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn exercise_met_defaults_to_five() {
        let ex = Exercise {
            id: Uuid::new_v4(),
            name: "plank".to_owned(),
            met_value: None,
        };
        assert_eq!(ex.met(), 5.0);

        let ex = Exercise {
            met_value: Some(8.5),
            ..ex
        };
        assert_eq!(ex.met(), 8.5);
    }

    #[test]
    fn meal_calories_default_to_five_hundred() {
        assert_eq!(meal(None, &[]).calories_or_default(), 500);
        assert_eq!(meal(Some(320), &[]).calories_or_default(), 320);
    }

    #[test]
    fn meal_protein_source_detection() {
        assert!(!meal(None, &[]).has_protein_source());
        assert!(meal(None, &["chicken"]).has_protein_source());
    }
}
