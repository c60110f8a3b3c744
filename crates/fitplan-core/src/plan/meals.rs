//! Per-day meal ranking and selection.
//!
//! Candidates are scored against a per-meal calorie target and an
//! intensity-derived protein preference; lower scores rank first. A soft
//! constraint discourages repeating the previous day's meals, with a
//! fallback to the full ranked list when exclusion would leave the day
//! short.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use fitplan_db::models::{Exercise, Meal, MealDay};
use fitplan_db::queries::meal_days;

use crate::error::PlanError;

/// Fixed number of meals per day.
pub const MEALS_PER_DAY: usize = 3;

/// Floor for the per-meal calorie target.
pub const MIN_PER_MEAL_CALORIES: i64 = 300;

/// Average MET at or above which protein-bearing meals are preferred.
pub const PROTEIN_PREFERENCE_MET: f64 = 6.0;

/// Score bonus for protein-bearing meals when protein is preferred. Large
/// enough to overwhelm any realistic calorie distance, so protein meals
/// dominate the ranking.
const PROTEIN_BONUS: i64 = -1000;

/// Mean MET value across a day's exercises; 0 when there are none.
pub fn average_met(exercises: &[Exercise]) -> f64 {
    if exercises.is_empty() {
        return 0.0;
    }
    exercises.iter().map(Exercise::met).sum::<f64>() / exercises.len() as f64
}

/// Per-meal calorie target: the daily intake split across the day's meals,
/// floored at [`MIN_PER_MEAL_CALORIES`].
pub fn per_meal_target(daily_intake_calories: i64, meals_count: usize) -> i64 {
    let per_meal =
        (daily_intake_calories as f64 / meals_count.max(1) as f64).round() as i64;
    per_meal.max(MIN_PER_MEAL_CALORIES)
}

/// A meal's score: calorie distance from the target, minus the protein
/// bonus when applicable. Lower is better.
fn score(meal: &Meal, prefer_protein: bool, target: i64) -> i64 {
    let protein = if prefer_protein && meal.has_protein_source() {
        PROTEIN_BONUS
    } else {
        0
    };
    protein + (meal.calories_or_default() - target).abs()
}

/// Rank candidates ascending by score.
///
/// Pure function of the meal attributes and the two scalars; the sort is
/// stable, so equal scores preserve candidate order.
pub fn rank_meals<'a>(candidates: &'a [Meal], prefer_protein: bool, target: i64) -> Vec<&'a Meal> {
    let mut ranked: Vec<&Meal> = candidates.iter().collect();
    ranked.sort_by_key(|m| score(m, prefer_protein, target));
    ranked
}

/// Pick the day's meals from the ranked list, excluding the previous day's
/// set when enough candidates remain.
///
/// When exclusion leaves fewer than `count` candidates, the exclusion is
/// discarded and the full ranked list is used (repeats only when necessary
/// to fill the day).
pub fn pick_from_ranked<'a>(
    ranked: &[&'a Meal],
    previous_day: &HashSet<Uuid>,
    count: usize,
) -> Vec<&'a Meal> {
    let filtered: Vec<&Meal> = ranked
        .iter()
        .copied()
        .filter(|m| !previous_day.contains(&m.id))
        .collect();

    let pool = if filtered.len() < count {
        ranked
    } else {
        &filtered
    };

    pool.iter().copied().take(count).collect()
}

/// Select the day's meal ids from the candidate pool.
pub fn select_for_day(
    candidates: &[Meal],
    average_met: f64,
    daily_intake_calories: i64,
    previous_day: &HashSet<Uuid>,
) -> Vec<Uuid> {
    let prefer_protein = average_met >= PROTEIN_PREFERENCE_MET;
    let target = per_meal_target(daily_intake_calories, MEALS_PER_DAY);

    let ranked = rank_meals(candidates, prefer_protein, target);
    pick_from_ranked(&ranked, previous_day, MEALS_PER_DAY)
        .into_iter()
        .map(|m| m.id)
        .collect()
}

/// Build and persist one day's meal collection.
///
/// `day_exercises` is that day's selected exercise set, read to derive the
/// intensity signal. Returns the day collection and the chosen meal ids;
/// the caller threads those ids into the next day's `previous_day` set.
pub async fn build_meal_day(
    pool: &SqlitePool,
    date: DateTime<Utc>,
    plan_id: i64,
    daily_intake_calories: i64,
    day_exercises: &[Exercise],
    candidates: &[Meal],
    previous_day: &HashSet<Uuid>,
) -> Result<(MealDay, Vec<Uuid>), PlanError> {
    let day = meal_days::insert_day(pool, date, plan_id, meal_days::DEFAULT_MEAL_RATIO).await?;

    let avg_met = average_met(day_exercises);
    let chosen = select_for_day(candidates, avg_met, daily_intake_calories, previous_day);
    meal_days::replace_entries(pool, day.id, &chosen).await?;

    tracing::debug!(
        day_id = %day.id,
        plan_id,
        avg_met,
        meals = chosen.len(),
        "built meal day"
    );

    Ok((day, chosen))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn meal(name: &str, calories: i64, protein: bool) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            calories: Some(calories),
            protein_sources: Json(if protein {
                vec!["tofu".to_owned()]
            } else {
                Vec::new()
            }),
        }
    }

    fn exercise(met: Option<f64>) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            name: "x".to_owned(),
            met_value: met,
        }
    }

    #[test]
    fn average_met_handles_missing_and_empty() {
        assert_eq!(average_met(&[]), 0.0);

        let exs = [exercise(Some(8.0)), exercise(None)];
        // Missing MET defaults to 5.
        assert!((average_met(&exs) - 6.5).abs() < 1e-9);
    }

    #[test]
    fn per_meal_target_floors_at_three_hundred() {
        assert_eq!(per_meal_target(1800, 3), 600);
        assert_eq!(per_meal_target(600, 3), 300);
        assert_eq!(per_meal_target(1801, 3), 600);
        assert_eq!(per_meal_target(1000, 0), 1000);
    }

    #[test]
    fn ranking_is_by_calorie_proximity_without_protein_preference() {
        let candidates = vec![
            meal("far", 900, true),
            meal("near", 610, false),
            meal("exact", 600, false),
        ];
        let ranked = rank_meals(&candidates, false, 600);
        let names: Vec<&str> = ranked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["exact", "near", "far"]);
    }

    #[test]
    fn protein_bonus_dominates_calorie_distance() {
        let candidates = vec![
            meal("exact-no-protein", 600, false),
            meal("far-protein", 1100, true),
        ];
        let ranked = rank_meals(&candidates, true, 600);
        assert_eq!(ranked[0].name, "far-protein");
    }

    #[test]
    fn ranking_is_deterministic() {
        let candidates: Vec<Meal> = (0..10)
            .map(|i| meal(&format!("m{i}"), 400 + i * 50, i % 2 == 0))
            .collect();
        let first: Vec<Uuid> = rank_meals(&candidates, true, 600).iter().map(|m| m.id).collect();
        for _ in 0..5 {
            let again: Vec<Uuid> =
                rank_meals(&candidates, true, 600).iter().map(|m| m.id).collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn previous_day_is_excluded_when_pool_allows() {
        let candidates: Vec<Meal> = (0..6).map(|i| meal(&format!("m{i}"), 600, false)).collect();
        let ranked = rank_meals(&candidates, false, 600);

        let previous: HashSet<Uuid> = ranked[..3].iter().map(|m| m.id).collect();
        let picked = pick_from_ranked(&ranked, &previous, MEALS_PER_DAY);

        assert_eq!(picked.len(), 3);
        for m in &picked {
            assert!(!previous.contains(&m.id));
        }
    }

    #[test]
    fn exclusion_falls_back_to_full_list_when_short() {
        let candidates: Vec<Meal> = (0..4).map(|i| meal(&format!("m{i}"), 600, false)).collect();
        let ranked = rank_meals(&candidates, false, 600);

        // Excluding 3 of 4 leaves too few; the fallback permits repeats.
        let previous: HashSet<Uuid> = ranked[..3].iter().map(|m| m.id).collect();
        let picked = pick_from_ranked(&ranked, &previous, MEALS_PER_DAY);

        assert_eq!(picked.len(), 3);
        let ranked_ids: Vec<Uuid> = ranked.iter().map(|m| m.id).collect();
        assert_eq!(
            picked.iter().map(|m| m.id).collect::<Vec<_>>(),
            ranked_ids[..3]
        );
    }

    #[test]
    fn pool_smaller_than_meals_count_yields_whole_pool() {
        let candidates = vec![meal("only", 500, false)];
        let chosen = select_for_day(&candidates, 0.0, 1800, &HashSet::new());
        assert_eq!(chosen.len(), 1);
    }

    #[test]
    fn empty_pool_yields_no_meals() {
        let chosen = select_for_day(&[], 7.0, 1800, &HashSet::new());
        assert!(chosen.is_empty());
    }
}
