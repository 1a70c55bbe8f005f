//! Planning-context loader.
//!
//! Pure reads: the snapshot of shift definitions, the window's shift
//! instances, employees, capacities, existing assignments, and absences.
//! The window spans the previous month through the planning-month end (plus
//! the tail Sunday after a Saturday month-end); assignments are read
//! through a join on the window's instances, so nothing outside the window
//! ever reaches the model.

use sqlx::SqlitePool;
use tracing::debug;

use roster_core::context::{PlanningWindow, Snapshot};

use crate::error::PlanError;
use crate::records::{
    AbsenceRow, AssignmentRow, CapacityRow, DefinitionRow, EmployeeRow, InstanceRow,
};

pub async fn load_snapshot(
    pool: &SqlitePool,
    window: &PlanningWindow,
) -> Result<Snapshot, PlanError> {
    let employees = sqlx::query_as::<_, EmployeeRow>(
        "SELECT id, given_name, family_name, function, area FROM employees ORDER BY id",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(EmployeeRow::into_employee)
    .collect::<Vec<_>>();

    let definitions = sqlx::query_as::<_, DefinitionRow>(
        "SELECT id, category, role, area, time_of_day, is_weekday, is_weekend \
         FROM shift_definitions ORDER BY id",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(DefinitionRow::into_definition)
    .collect::<Result<Vec<_>, _>>()?;

    let instances = sqlx::query_as::<_, InstanceRow>(
        "SELECT id, definition_id, date, calendar_week, month FROM shift_instances \
         WHERE date BETWEEN ?1 AND ?2 ORDER BY date, id",
    )
    .bind(window.window_start())
    .bind(window.window_end)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(InstanceRow::into_instance)
    .collect::<Vec<_>>();

    let capacities = sqlx::query_as::<_, CapacityRow>(
        "SELECT id, employee_id, capacity_type, max_count FROM employee_capacities ORDER BY id",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(CapacityRow::into_capacity)
    .collect::<Result<Vec<_>, _>>()?;

    let assignments = sqlx::query_as::<_, AssignmentRow>(
        "SELECT a.id, a.employee_id, a.shift_instance_id, a.source FROM assignments a \
         JOIN shift_instances s ON s.id = a.shift_instance_id \
         WHERE s.date BETWEEN ?1 AND ?2 ORDER BY a.id",
    )
    .bind(window.window_start())
    .bind(window.window_end)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(AssignmentRow::into_assignment)
    .collect::<Result<Vec<_>, _>>()?;

    let absences = sqlx::query_as::<_, AbsenceRow>(
        "SELECT employee_id, date FROM absences WHERE date BETWEEN ?1 AND ?2",
    )
    .bind(window.window_start())
    .bind(window.window_end)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| (row.employee_id, row.date))
    .collect();

    debug!(
        month = %window.month,
        employees = employees.len(),
        definitions = definitions.len(),
        instances = instances.len(),
        assignments = assignments.len(),
        "snapshot loaded"
    );

    Ok(Snapshot {
        employees,
        definitions,
        instances,
        capacities,
        assignments,
        absences,
    })
}
