//! Plan scheduling and selection engine.
//!
//! Builds and maintains a user's multi-day exercise-and-meal schedule:
//! expands a plan length into a day series, constructs per-day exercise
//! sessions with shared settings, ranks and selects meals against calorie
//! and intensity targets, and manages the plan lifecycle (replace, update,
//! cascaded delete).

pub mod calculator;
pub mod error;
pub mod plan;
