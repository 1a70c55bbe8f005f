use roster_core::context::ContextError;
use thiserror::Error;

/// Structured failure of one planning run. Nothing is ever written when any
/// of these surfaces; the writer's transaction rolls back on store errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Rejected before anything was read.
    #[error("invalid planning input: {0}")]
    Input(ContextError),
    /// The loaded snapshot contradicts itself.
    #[error("inconsistent store data: {0}")]
    Data(ContextError),
    #[error("store row {table}.{id} carries unknown value '{value}' in column {column}")]
    BadColumn {
        table: &'static str,
        column: &'static str,
        id: i64,
        value: String,
    },
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("solver task failed: {0}")]
    SolverTask(String),
}
