//! Migration smoke tests: the embedded migrations produce the expected
//! schema and are idempotent.

use fitplan_db::pool;
use fitplan_test_utils::create_test_db;

#[tokio::test]
async fn migrations_create_all_tables() {
    let pool = create_test_db().await;

    let counts = pool::table_counts(&pool)
        .await
        .expect("table_counts should succeed");
    let names: Vec<&str> = counts.iter().map(|(name, _)| name.as_str()).collect();

    for table in [
        "plans",
        "session_settings",
        "exercise_days",
        "exercise_entries",
        "meal_days",
        "meal_entries",
        "exercises",
        "meals",
    ] {
        assert!(names.contains(&table), "missing table {table}");
    }

    // Fresh database, every table empty.
    for (name, count) in &counts {
        assert_eq!(*count, 0, "table {name} should be empty");
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let pool = create_test_db().await;

    // create_test_db already ran them once.
    pool::run_migrations(&pool)
        .await
        .expect("second run should be a no-op");
}
