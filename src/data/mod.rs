//! Data layer module
//!
//! Relationship store and user aggregate repository:
//! - SQLite database operations
//! - Row models and edge transition types

mod database;
mod models;

pub use database::Database;
pub use models::*;

#[cfg(test)]
mod database_test;
