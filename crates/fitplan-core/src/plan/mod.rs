//! Plan construction and lifecycle.
//!
//! `day_series` expands a start date into calendar-day markers; `session`
//! builds one day's exercise session; `meals` ranks and selects one day's
//! meals; `lifecycle` orchestrates whole-plan create/replace, per-day
//! updates, and cascaded deletion.

pub mod day_series;
pub mod lifecycle;
pub mod meals;
pub mod session;

pub use day_series::{MAX_MATERIALIZED_DAYS, day_series};
