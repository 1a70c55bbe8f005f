//! Assignment writer.
//!
//! Persists the solver's pairs under the requested merge policy. MANUAL
//! rows are never touched. One transaction wraps the whole delete+insert
//! batch; a failure anywhere rolls everything back and the store is
//! unchanged.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::info;

use roster_core::types::{AssignmentSource, EmployeeId, MergePolicy, ShiftInstanceId};

use crate::error::PlanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub created: u64,
    pub skipped: u64,
    pub deleted: u64,
}

/// RESPECT inserts only pairs that do not exist yet and deletes nothing.
/// OVERWRITE first clears SOLVER rows whose shift date falls in
/// `[start_date, end_date]`, then inserts. Inserts are insert-if-absent
/// under both policies: the solver echoes fixed context pairs back, and
/// those rows already exist.
pub async fn write_assignments(
    pool: &SqlitePool,
    policy: MergePolicy,
    start_date: NaiveDate,
    end_date: NaiveDate,
    assignments: &[(EmployeeId, ShiftInstanceId)],
) -> Result<WriteSummary, PlanError> {
    let mut tx = pool.begin().await?;

    let mut deleted = 0u64;
    if policy == MergePolicy::Overwrite {
        deleted = sqlx::query(
            "DELETE FROM assignments WHERE source = ?1 AND shift_instance_id IN \
             (SELECT id FROM shift_instances WHERE date BETWEEN ?2 AND ?3)",
        )
        .bind(AssignmentSource::Solver.as_str())
        .bind(start_date)
        .bind(end_date)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    let mut created = 0u64;
    let mut skipped = 0u64;
    for &(employee_id, shift_instance_id) in assignments {
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO assignments (employee_id, shift_instance_id, source) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(employee_id)
        .bind(shift_instance_id)
        .bind(AssignmentSource::Solver.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if inserted == 1 {
            created += 1;
        } else {
            skipped += 1;
        }
    }

    tx.commit().await?;
    info!(?policy, deleted, created, skipped, "assignments written");
    Ok(WriteSummary {
        created,
        skipped,
        deleted,
    })
}
