//! Postgres connection pool and migration runner.

pub mod pool;

pub use pool::{create_pool, run_migrations, DatabaseError};
