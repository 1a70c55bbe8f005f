//! Relational boundary of the duty-roster planner.
//!
//! Owns the SQLite schema, the snapshot loader, the assignment writer, and
//! the public [`plan`] operation. The planning semantics themselves live in
//! `roster_core`; this crate only moves rows in and out of the store around
//! one solver run.

pub mod error;
pub mod loader;
pub mod plan;
pub mod writer;

mod records;

pub use error::PlanError;
pub use plan::{plan, PlanOutcome, PlanRequest};
pub use writer::WriteSummary;

use sqlx::SqlitePool;

/// Applies the bundled schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), PlanError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
