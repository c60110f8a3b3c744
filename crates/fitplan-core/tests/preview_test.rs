//! Integration tests for plan preview: profile validation, calculator
//! dispatch through the trait object, and catalog enrichment.

use async_trait::async_trait;
use chrono::{Days, Utc};
use uuid::Uuid;

use fitplan_core::calculator::{
    ActivityLevel, DefaultCalculator, Gender, PlanCalculator, PlanParameters, UserProfile,
};
use fitplan_core::error::PlanError;
use fitplan_core::plan::lifecycle;
use fitplan_test_utils::{create_test_db, seed_catalog};

fn complete_profile() -> UserProfile {
    UserProfile {
        current_weight_kg: Some(82.0),
        goal_weight_kg: Some(76.0),
        current_height_cm: Some(178.0),
        age_years: Some(34),
        gender: Gender::Male,
        activity_level: ActivityLevel::ModeratelyActive,
    }
}

/// Calculator stub returning fixed parameters, for isolating the preview
/// path from the arithmetic.
struct FixedCalculator {
    exercise_ids: Vec<Uuid>,
    meal_ids: Vec<Uuid>,
}

#[async_trait]
impl PlanCalculator for FixedCalculator {
    async fn generate_plan(&self, _profile: &UserProfile) -> anyhow::Result<PlanParameters> {
        let start_date = Utc::now();
        Ok(PlanParameters {
            daily_goal_calories: 2000,
            plan_length_in_days: 14,
            daily_intake_calories: 1800,
            daily_outtake_calories: 500,
            recommended_exercise_ids: self.exercise_ids.clone(),
            recommended_meal_ids: self.meal_ids.clone(),
            start_date,
            end_date: start_date.checked_add_days(Days::new(14)).unwrap(),
        })
    }
}

#[tokio::test]
async fn preview_rejects_incomplete_profiles() {
    let pool = create_test_db().await;
    let calculator = FixedCalculator {
        exercise_ids: Vec::new(),
        meal_ids: Vec::new(),
    };

    let mut profile = complete_profile();
    profile.current_height_cm = None;

    let err = lifecycle::preview_plan(&pool, &calculator, &profile)
        .await
        .expect_err("incomplete profile should be rejected");
    assert!(matches!(err, PlanError::InvalidInput(_)));
}

#[tokio::test]
async fn preview_enriches_parameters_with_catalog_records() {
    let pool = create_test_db().await;
    let (exercise_ids, meal_ids) = seed_catalog(&pool, 4, 5).await;

    let calculator = FixedCalculator {
        exercise_ids: exercise_ids.clone(),
        meal_ids: meal_ids.clone(),
    };

    let preview = lifecycle::preview_plan(&pool, &calculator, &complete_profile())
        .await
        .expect("preview should succeed");

    assert_eq!(preview.parameters.plan_length_in_days, 14);
    assert_eq!(preview.exercises.len(), 4);
    assert_eq!(preview.meals.len(), 5);
    for exercise in &preview.exercises {
        assert!(exercise_ids.contains(&exercise.id));
    }
}

#[tokio::test]
async fn preview_persists_nothing() {
    let pool = create_test_db().await;
    let (exercise_ids, meal_ids) = seed_catalog(&pool, 4, 5).await;

    let calculator = FixedCalculator {
        exercise_ids,
        meal_ids,
    };
    lifecycle::preview_plan(&pool, &calculator, &complete_profile())
        .await
        .expect("preview should succeed");

    let counts = fitplan_db::pool::table_counts(&pool)
        .await
        .expect("table_counts should succeed");
    for (name, count) in &counts {
        if name == "plans" || name == "exercise_days" || name == "meal_days" {
            assert_eq!(*count, 0, "preview must not write to {name}");
        }
    }
}

#[tokio::test]
async fn default_calculator_produces_sane_parameters() {
    let pool = create_test_db().await;
    let (exercise_ids, meal_ids) = seed_catalog(&pool, 6, 8).await;

    let calculator = DefaultCalculator::new(pool.clone());
    let preview = lifecycle::preview_plan(&pool, &calculator, &complete_profile())
        .await
        .expect("preview should succeed");

    let p = &preview.parameters;
    // Weight loss profile: intake floored, an outtake target set, and a plan
    // length inside the supported window.
    assert!(p.daily_intake_calories >= 1200);
    assert_eq!(p.daily_outtake_calories, 500);
    assert!((7..=90).contains(&p.plan_length_in_days));
    assert!(p.end_date > p.start_date);

    // The default calculator recommends the whole catalog.
    assert_eq!(p.recommended_exercise_ids.len(), exercise_ids.len());
    assert_eq!(p.recommended_meal_ids.len(), meal_ids.len());
}
