//! Biometric-to-calorie-target calculation.
//!
//! [`PlanCalculator`] is the seam to the parameter calculator collaborator:
//! given a user profile it produces the targets and candidate pools that
//! drive plan creation. [`DefaultCalculator`] is a catalog-backed
//! implementation using the Mifflin-St Jeor resting-energy equation
//! (Mifflin et al. 1990) with a standard activity multiplier.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Days, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use fitplan_db::queries::catalog;

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

/// Gender for the resting-energy equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(GenderParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Gender`] string.
#[derive(Debug, Clone)]
pub struct GenderParseError(pub String);

impl fmt::Display for GenderParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid gender: {:?}", self.0)
    }
}

impl std::error::Error for GenderParseError {}

// ---------------------------------------------------------------------------

/// Lifestyle activity level, scaling resting energy to daily expenditure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    /// The multiplier applied to resting energy expenditure.
    pub fn factor(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sedentary => "sedentary",
            Self::LightlyActive => "lightly_active",
            Self::ModeratelyActive => "moderately_active",
            Self::VeryActive => "very_active",
            Self::ExtraActive => "extra_active",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityLevel {
    type Err = ActivityLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(Self::Sedentary),
            "lightly_active" => Ok(Self::LightlyActive),
            "moderately_active" => Ok(Self::ModeratelyActive),
            "very_active" => Ok(Self::VeryActive),
            "extra_active" => Ok(Self::ExtraActive),
            other => Err(ActivityLevelParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ActivityLevel`] string.
#[derive(Debug, Clone)]
pub struct ActivityLevelParseError(pub String);

impl fmt::Display for ActivityLevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid activity level: {:?}", self.0)
    }
}

impl std::error::Error for ActivityLevelParseError {}

// ---------------------------------------------------------------------------

/// A user's biometric profile.
///
/// Weight, goal weight, and height are required before any plan operation
/// may call the calculator; the rest defaults sensibly.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UserProfile {
    pub current_weight_kg: Option<f64>,
    pub goal_weight_kg: Option<f64>,
    pub current_height_cm: Option<f64>,
    pub age_years: Option<u32>,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl UserProfile {
    /// Whether the three required biometric fields are present.
    pub fn is_complete(&self) -> bool {
        self.current_weight_kg.is_some()
            && self.goal_weight_kg.is_some()
            && self.current_height_cm.is_some()
    }
}

/// The calculator's output: targets plus candidate pools for one plan.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanParameters {
    pub daily_goal_calories: i64,
    pub plan_length_in_days: u32,
    pub daily_intake_calories: i64,
    pub daily_outtake_calories: i64,
    pub recommended_exercise_ids: Vec<Uuid>,
    pub recommended_meal_ids: Vec<Uuid>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Calculator trait + default implementation
// ---------------------------------------------------------------------------

/// The parameter-calculator collaborator.
///
/// Object-safe so callers can hold `Box<dyn PlanCalculator>` and swap
/// implementations (the engine's tests use a stub).
#[async_trait]
pub trait PlanCalculator: Send + Sync {
    /// Compute plan parameters for a complete profile.
    ///
    /// Callers must verify [`UserProfile::is_complete`] first; behaviour on
    /// an incomplete profile is implementation-defined.
    async fn generate_plan(&self, profile: &UserProfile) -> Result<PlanParameters>;
}

/// Catalog-backed calculator: Mifflin-St Jeor resting energy scaled by
/// activity level, with the whole catalog as the candidate pools.
pub struct DefaultCalculator {
    pool: SqlitePool,
}

impl DefaultCalculator {
    /// Weekly weight change the plan length is sized for, in kg.
    const KG_PER_WEEK: f64 = 0.5;
    /// Calorie deficit applied when losing weight.
    const LOSS_DEFICIT: f64 = 500.0;
    /// Calorie surplus applied when gaining weight.
    const GAIN_SURPLUS: f64 = 300.0;
    /// Intake floor.
    const MIN_INTAKE: i64 = 1200;

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Mifflin-St Jeor resting energy expenditure in kcal/day.
    fn bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
        let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
        match gender {
            Gender::Male => base + 5.0,
            Gender::Female => base - 161.0,
            // Midpoint of the male and female constants.
            Gender::Other => base - 78.0,
        }
    }
}

#[async_trait]
impl PlanCalculator for DefaultCalculator {
    async fn generate_plan(&self, profile: &UserProfile) -> Result<PlanParameters> {
        let weight = profile.current_weight_kg.unwrap_or(70.0);
        let goal = profile.goal_weight_kg.unwrap_or(weight);
        let height = profile.current_height_cm.unwrap_or(170.0);
        let age = profile.age_years.unwrap_or(30);

        let bmr = Self::bmr(weight, height, age, profile.gender);
        let tdee = bmr * profile.activity_level.factor();

        let delta = goal - weight;
        let intake = if delta < 0.0 {
            ((tdee - Self::LOSS_DEFICIT) as i64).max(Self::MIN_INTAKE)
        } else if delta > 0.0 {
            (tdee + Self::GAIN_SURPLUS) as i64
        } else {
            tdee as i64
        };
        let outtake = if delta < 0.0 { 500 } else { 300 };

        let weeks = (delta.abs() / Self::KG_PER_WEEK).ceil() as u32;
        let plan_length_in_days = (weeks * 7).clamp(7, 90);

        let exercises = catalog::list_exercises(&self.pool).await?;
        let meals = catalog::list_meals(&self.pool).await?;

        let start_date = Utc::now();
        let end_date = start_date
            .checked_add_days(Days::new(u64::from(plan_length_in_days)))
            .unwrap_or(start_date);

        tracing::debug!(
            bmr = bmr.round(),
            tdee = tdee.round(),
            plan_length_in_days,
            "computed plan parameters"
        );

        Ok(PlanParameters {
            daily_goal_calories: intake,
            plan_length_in_days,
            daily_intake_calories: intake,
            daily_outtake_calories: outtake,
            recommended_exercise_ids: exercises.into_iter().map(|e| e.id).collect(),
            recommended_meal_ids: meals.into_iter().map(|m| m.id).collect(),
            start_date,
            end_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmr_matches_published_values() {
        // 80 kg, 175 cm, 30 y male: 10*80 + 6.25*175 - 5*30 + 5 = 1748.75
        let bmr = DefaultCalculator::bmr(80.0, 175.0, 30, Gender::Male);
        assert!((bmr - 1748.75).abs() < 1e-9);

        // Same biometrics, female: 1582.75
        let bmr = DefaultCalculator::bmr(80.0, 175.0, 30, Gender::Female);
        assert!((bmr - 1582.75).abs() < 1e-9);
    }

    #[test]
    fn activity_factors_increase_monotonically() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::LightlyActive,
            ActivityLevel::ModeratelyActive,
            ActivityLevel::VeryActive,
            ActivityLevel::ExtraActive,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0].factor() < pair[1].factor());
        }
    }

    #[test]
    fn gender_display_roundtrip() {
        for v in [Gender::Male, Gender::Female, Gender::Other] {
            let parsed: Gender = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn activity_level_display_roundtrip() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::LightlyActive,
            ActivityLevel::ModeratelyActive,
            ActivityLevel::VeryActive,
            ActivityLevel::ExtraActive,
        ];
        for v in levels {
            let parsed: ActivityLevel = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
        assert!("couch".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn profile_completeness() {
        let mut profile = UserProfile {
            current_weight_kg: Some(80.0),
            goal_weight_kg: Some(75.0),
            current_height_cm: None,
            age_years: None,
            gender: Gender::Other,
            activity_level: ActivityLevel::ModeratelyActive,
        };
        assert!(!profile.is_complete());
        profile.current_height_cm = Some(175.0);
        assert!(profile.is_complete());
    }
}
