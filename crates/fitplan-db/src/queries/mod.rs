//! Database query functions, one module per table family.

pub mod catalog;
pub mod exercise_days;
pub mod meal_days;
pub mod plans;
pub mod settings;
