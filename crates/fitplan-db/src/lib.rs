//! Persistence layer for fitplan: connection pool, embedded migrations, row
//! models, and query modules for plans, session settings, day collections,
//! and the exercise/meal catalog.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
