//! `PostgreSQL` adapter for the state store port.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresStateStore, StatePgPool};
