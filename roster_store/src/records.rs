//! Row structs for the store tables and their conversion into domain types.
//!
//! Enum-valued columns are stored as their canonical text; a value the
//! domain does not know is a [`PlanError::BadColumn`], never a silent
//! fallback.

use chrono::NaiveDate;
use sqlx::FromRow;

use roster_core::types::{
    Area, Assignment, AssignmentSource, CapacityType, Employee, EmployeeCapacity, Role,
    ShiftCategory, ShiftDefinition, ShiftInstance, TimeOfDay,
};

use crate::error::PlanError;

fn bad_column(
    table: &'static str,
    column: &'static str,
    id: i64,
    value: &str,
) -> PlanError {
    PlanError::BadColumn {
        table,
        column,
        id,
        value: value.to_string(),
    }
}

#[derive(FromRow)]
pub(crate) struct EmployeeRow {
    pub id: i64,
    pub given_name: String,
    pub family_name: String,
    pub function: String,
    pub area: Option<String>,
}

impl EmployeeRow {
    // Employee areas are free-form in the store; unknown collapses to None.
    pub(crate) fn into_employee(self) -> Employee {
        Employee {
            id: self.id,
            given_name: self.given_name,
            family_name: self.family_name,
            function: self.function,
            area: self.area.as_deref().and_then(Area::normalise),
        }
    }
}

#[derive(FromRow)]
pub(crate) struct DefinitionRow {
    pub id: i64,
    pub category: String,
    pub role: String,
    pub area: String,
    pub time_of_day: String,
    pub is_weekday: bool,
    pub is_weekend: bool,
}

impl DefinitionRow {
    pub(crate) fn into_definition(self) -> Result<ShiftDefinition, PlanError> {
        let table = "shift_definitions";
        Ok(ShiftDefinition {
            id: self.id,
            category: ShiftCategory::parse(&self.category)
                .ok_or_else(|| bad_column(table, "category", self.id, &self.category))?,
            role: Role::parse(&self.role)
                .ok_or_else(|| bad_column(table, "role", self.id, &self.role))?,
            area: Area::normalise(&self.area)
                .ok_or_else(|| bad_column(table, "area", self.id, &self.area))?,
            time_of_day: TimeOfDay::parse(&self.time_of_day)
                .ok_or_else(|| bad_column(table, "time_of_day", self.id, &self.time_of_day))?,
            is_weekday: self.is_weekday,
            is_weekend: self.is_weekend,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct InstanceRow {
    pub id: i64,
    pub definition_id: i64,
    pub date: NaiveDate,
    pub calendar_week: u32,
    pub month: String,
}

impl InstanceRow {
    pub(crate) fn into_instance(self) -> ShiftInstance {
        ShiftInstance {
            id: self.id,
            definition_id: self.definition_id,
            date: self.date,
            calendar_week: self.calendar_week,
            month: self.month,
        }
    }
}

#[derive(FromRow)]
pub(crate) struct CapacityRow {
    pub id: i64,
    pub employee_id: i64,
    pub capacity_type: String,
    pub max_count: u32,
}

impl CapacityRow {
    pub(crate) fn into_capacity(self) -> Result<EmployeeCapacity, PlanError> {
        Ok(EmployeeCapacity {
            id: self.id,
            employee_id: self.employee_id,
            capacity_type: CapacityType::parse(&self.capacity_type).ok_or_else(|| {
                bad_column(
                    "employee_capacities",
                    "capacity_type",
                    self.id,
                    &self.capacity_type,
                )
            })?,
            max_count: self.max_count,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct AssignmentRow {
    pub id: i64,
    pub employee_id: i64,
    pub shift_instance_id: i64,
    pub source: String,
}

impl AssignmentRow {
    pub(crate) fn into_assignment(self) -> Result<Assignment, PlanError> {
        Ok(Assignment {
            id: self.id,
            employee_id: self.employee_id,
            shift_instance_id: self.shift_instance_id,
            source: AssignmentSource::parse(&self.source)
                .ok_or_else(|| bad_column("assignments", "source", self.id, &self.source))?,
        })
    }
}

#[derive(FromRow)]
pub(crate) struct AbsenceRow {
    pub employee_id: i64,
    pub date: NaiveDate,
}
