//! Integration tests for session settings: defaults, atomic upsert, and
//! the reference scans that gate shared-settings deletion.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use fitplan_db::models::SessionSettings;
use fitplan_db::queries::{exercise_days, settings};
use fitplan_test_utils::create_test_db;

#[tokio::test]
async fn insert_applies_defaults_for_omitted_fields() {
    let pool = create_test_db().await;

    let s = settings::insert_settings(&pool, &settings::SettingsPatch::default())
        .await
        .expect("insert_settings should succeed");

    assert_eq!(s.round, SessionSettings::DEFAULT_ROUND);
    assert_eq!(
        s.num_of_workouts_per_round,
        SessionSettings::DEFAULT_WORKOUTS_PER_ROUND
    );
    assert_eq!(s.exercise_time, SessionSettings::DEFAULT_EXERCISE_TIME);
    assert_eq!(s.transition_time, SessionSettings::DEFAULT_TRANSITION_TIME);
    assert_eq!(s.rest_time, SessionSettings::DEFAULT_REST_TIME);
    assert_eq!(s.rest_frequency, SessionSettings::DEFAULT_REST_FREQUENCY);
    assert!(s.is_start_with_warm_up);
    assert!(s.is_shuffle);
}

#[tokio::test]
async fn insert_honours_supplied_fields() {
    let pool = create_test_db().await;

    let patch = settings::SettingsPatch {
        round: Some(5),
        exercise_time: Some(60),
        num_of_workouts_per_round: None,
    };
    let s = settings::insert_settings(&pool, &patch)
        .await
        .expect("insert_settings should succeed");

    assert_eq!(s.round, 5);
    assert_eq!(s.exercise_time, 60);
    assert_eq!(
        s.num_of_workouts_per_round,
        SessionSettings::DEFAULT_WORKOUTS_PER_ROUND
    );
}

#[tokio::test]
async fn upsert_creates_when_absent_and_patches_when_present() {
    let pool = create_test_db().await;
    let id = Uuid::new_v4();

    // First call inserts with defaults where the patch is silent.
    let created = settings::upsert_settings(
        &pool,
        id,
        &settings::SettingsPatch {
            round: Some(4),
            exercise_time: None,
            num_of_workouts_per_round: None,
        },
    )
    .await
    .expect("upsert should insert");
    assert_eq!(created.id, id);
    assert_eq!(created.round, 4);
    assert_eq!(created.exercise_time, SessionSettings::DEFAULT_EXERCISE_TIME);

    // Second call patches only what it names.
    let patched = settings::upsert_settings(
        &pool,
        id,
        &settings::SettingsPatch {
            round: None,
            exercise_time: Some(90),
            num_of_workouts_per_round: None,
        },
    )
    .await
    .expect("upsert should update");
    assert_eq!(patched.id, id);
    assert_eq!(patched.round, 4);
    assert_eq!(patched.exercise_time, 90);
    assert_eq!(patched.created_at, created.created_at);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let pool = create_test_db().await;

    let s = settings::insert_settings(&pool, &settings::SettingsPatch::default())
        .await
        .expect("insert_settings should succeed");

    let first = settings::delete_settings(&pool, s.id)
        .await
        .expect("delete should succeed");
    assert!(first);

    let second = settings::delete_settings(&pool, s.id)
        .await
        .expect("repeat delete should succeed");
    assert!(!second);
}

#[tokio::test]
async fn reference_scan_excludes_the_day_being_deleted() {
    let pool = create_test_db().await;

    let s = settings::insert_settings(&pool, &settings::SettingsPatch::default())
        .await
        .expect("insert_settings should succeed");

    let date = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    let a = exercise_days::insert_day(&pool, date, 1, s.id)
        .await
        .expect("insert_day should succeed");
    let b = exercise_days::insert_day(&pool, date, 1, s.id)
        .await
        .expect("insert_day should succeed");

    // Deleting day `a`: day `b` still references the settings row.
    let refs = settings::count_referencing_days_excluding(&pool, s.id, a.id)
        .await
        .expect("scan should succeed");
    assert_eq!(refs, 1);

    exercise_days::delete_day(&pool, a.id)
        .await
        .expect("delete_day should succeed");

    // Now deleting day `b`: no one else references the row.
    let refs = settings::count_referencing_days_excluding(&pool, s.id, b.id)
        .await
        .expect("scan should succeed");
    assert_eq!(refs, 0);
}

#[tokio::test]
async fn reference_scan_scoped_outside_a_plan() {
    let pool = create_test_db().await;

    let s = settings::insert_settings(&pool, &settings::SettingsPatch::default())
        .await
        .expect("insert_settings should succeed");

    let date = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    exercise_days::insert_day(&pool, date, 1, s.id)
        .await
        .expect("insert_day should succeed");
    exercise_days::insert_day(&pool, date, 1, s.id)
        .await
        .expect("insert_day should succeed");

    // A whole-plan cascade ignores the plan's own days.
    let refs = settings::count_referencing_days_outside_plan(&pool, s.id, 1)
        .await
        .expect("scan should succeed");
    assert_eq!(refs, 0);

    // A day in another plan keeps the row alive.
    exercise_days::insert_day(&pool, date, 2, s.id)
        .await
        .expect("insert_day should succeed");
    let refs = settings::count_referencing_days_outside_plan(&pool, s.id, 1)
        .await
        .expect("scan should succeed");
    assert_eq!(refs, 1);
}

#[tokio::test]
async fn distinct_settings_for_plan_deduplicates() {
    let pool = create_test_db().await;

    let shared = settings::insert_settings(&pool, &settings::SettingsPatch::default())
        .await
        .expect("insert_settings should succeed");
    let solo = settings::insert_settings(&pool, &settings::SettingsPatch::default())
        .await
        .expect("insert_settings should succeed");

    let date = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    exercise_days::insert_day(&pool, date, 1, shared.id)
        .await
        .expect("insert_day should succeed");
    exercise_days::insert_day(&pool, date, 1, shared.id)
        .await
        .expect("insert_day should succeed");
    exercise_days::insert_day(&pool, date, 1, solo.id)
        .await
        .expect("insert_day should succeed");

    let mut ids = exercise_days::distinct_settings_for_plan(&pool, 1)
        .await
        .expect("distinct scan should succeed");
    ids.sort();
    let mut expected = vec![shared.id, solo.id];
    expected.sort();
    assert_eq!(ids, expected);
}
