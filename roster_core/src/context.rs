//! Planning context assembly.
//!
//! Turns a raw relational snapshot into the self-contained input of the
//! constraint compiler: the planable employees with their quota maps, the
//! window's shift instances with resolved definitions, the fixed-assignment
//! set, absences, and the forward/reverse index maps. All data-consistency
//! checking happens here, before any model is built and before anything is
//! written.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::types::shift::month_tag;
use crate::types::{
    Assignment, AssignmentSource, CapacityType, Employee, EmployeeCapacity, EmployeeId,
    MergePolicy, Role, ShiftDefinition, ShiftInstance, ShiftInstanceId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("end date {end} precedes start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("start {start} and end {end} lie in different months")]
    PlanningMonthMismatch { start: NaiveDate, end: NaiveDate },
    #[error("calendar arithmetic left the supported date range")]
    DateOverflow,
    #[error("duplicate employee id {0}")]
    DuplicateEmployee(i64),
    #[error("duplicate shift definition id {0}")]
    DuplicateDefinition(i64),
    #[error("duplicate shift instance id {0}")]
    DuplicateInstance(i64),
    #[error("shift definition {definition} has weekday/weekend flags inconsistent with its category")]
    DayFlagMismatch { definition: i64 },
    #[error("shift instance {instance} references unknown definition {definition}")]
    UnknownDefinition { instance: i64, definition: i64 },
    #[error("shift instance {instance} on {date} lies outside the loaded window")]
    InstanceOutsideWindow { instance: i64, date: NaiveDate },
    #[error("shift instance {instance} carries month tag '{tag}' but falls on {date}")]
    MonthTagMismatch { instance: i64, tag: String, date: NaiveDate },
    #[error("shift instance {instance} carries calendar week {tag} but falls on {date}")]
    WeekTagMismatch { instance: i64, tag: u32, date: NaiveDate },
    #[error("weekend flag of definition for instance {instance} disagrees with its date {date}")]
    WeekendDateMismatch { instance: i64, date: NaiveDate },
    #[error("assignment {assignment} references unknown shift instance {instance}")]
    UnknownInstance { assignment: i64, instance: i64 },
    #[error("assignment {assignment} references unknown employee {employee}")]
    UnknownEmployee { assignment: i64, employee: i64 },
    #[error("fixed assignment {assignment} references employee {employee} without a planable role")]
    UnplanableAssignee { assignment: i64, employee: i64 },
}

/// The calendar frame of one planning run.
///
/// The planning month is derived from the caller's start date; the loaded
/// window always spans the previous month as context and, when the planning
/// month ends on a Saturday, one tail day so the adjacent Sunday can take
/// part in weekend coupling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningWindow {
    pub month: String,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub prev_month_start: NaiveDate,
    pub prev_month_end: NaiveDate,
    pub window_end: NaiveDate,
}

impl PlanningWindow {
    pub fn for_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, ContextError> {
        if end < start {
            return Err(ContextError::EndBeforeStart { start, end });
        }
        if (start.year(), start.month()) != (end.year(), end.month()) {
            return Err(ContextError::PlanningMonthMismatch { start, end });
        }

        let month_start = NaiveDate::from_ymd_opt(start.year(), start.month(), 1)
            .ok_or(ContextError::DateOverflow)?;
        let next_month_start = match start.month() {
            12 => NaiveDate::from_ymd_opt(start.year() + 1, 1, 1),
            m => NaiveDate::from_ymd_opt(start.year(), m + 1, 1),
        }
        .ok_or(ContextError::DateOverflow)?;
        let month_end = next_month_start - Duration::days(1);
        let prev_month_end = month_start - Duration::days(1);
        let prev_month_start =
            NaiveDate::from_ymd_opt(prev_month_end.year(), prev_month_end.month(), 1)
                .ok_or(ContextError::DateOverflow)?;

        // Saturday month-end: pull in the following Sunday as context.
        let window_end = if month_end.weekday() == Weekday::Sat {
            month_end + Duration::days(1)
        } else {
            month_end
        };

        Ok(PlanningWindow {
            month: month_tag(month_start),
            month_start,
            month_end,
            prev_month_start,
            prev_month_end,
            window_end,
        })
    }

    pub fn window_start(&self) -> NaiveDate {
        self.prev_month_start
    }

    pub fn has_tail_day(&self) -> bool {
        self.window_end != self.month_end
    }

    pub fn in_planning_month(&self, date: NaiveDate) -> bool {
        self.month_start <= date && date <= self.month_end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.prev_month_start <= date && date <= self.window_end
    }
}

/// Monday of the ISO week a date falls in. Weekend pairing and week-over-week
/// rotation are keyed by this date so year boundaries need no special case.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Everything the loader read for one run, still unvalidated.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub employees: Vec<Employee>,
    pub definitions: Vec<ShiftDefinition>,
    pub instances: Vec<ShiftInstance>,
    pub capacities: Vec<EmployeeCapacity>,
    pub assignments: Vec<Assignment>,
    pub absences: HashSet<(EmployeeId, NaiveDate)>,
}

/// A planable employee: role mapped, area canonical, quota map complete.
#[derive(Debug, Clone)]
pub struct PlannedEmployee {
    pub employee: Employee,
    pub role: Role,
    pub capacities: BTreeMap<CapacityType, u32>,
}

impl PlannedEmployee {
    pub fn capacity(&self, capacity_type: CapacityType) -> u32 {
        self.capacities.get(&capacity_type).copied().unwrap_or(0)
    }
}

/// The validated, self-contained input of the constraint compiler.
///
/// Employees and instances are indexed by their position; the compiler works
/// on those indices and the solver driver resolves them back to ids.
#[derive(Debug, Clone)]
pub struct PlanningContext {
    pub window: PlanningWindow,
    pub policy: MergePolicy,
    pub employees: Vec<PlannedEmployee>,
    pub instances: Vec<ShiftInstance>,
    pub definitions: HashMap<i64, ShiftDefinition>,
    /// `(employee index, instance index)` pairs the model must force to 1.
    pub fixed: BTreeSet<(usize, usize)>,
    pub absences: HashSet<(EmployeeId, NaiveDate)>,
    employee_index: HashMap<EmployeeId, usize>,
    instance_index: HashMap<ShiftInstanceId, usize>,
}

impl PlanningContext {
    pub fn assemble(
        window: PlanningWindow,
        policy: MergePolicy,
        snapshot: Snapshot,
    ) -> Result<PlanningContext, ContextError> {
        // Definitions first; instances resolve against them.
        let mut definitions: HashMap<i64, ShiftDefinition> = HashMap::new();
        for definition in snapshot.definitions {
            if !definition.flags_consistent() {
                return Err(ContextError::DayFlagMismatch {
                    definition: definition.id,
                });
            }
            let id = definition.id;
            if definitions.insert(id, definition).is_some() {
                return Err(ContextError::DuplicateDefinition(id));
            }
        }

        // Role of every employee row, planable or not; fixed-assignment
        // classification below needs the distinction between "unknown id"
        // and "known but unplanable".
        let mut roles: HashMap<EmployeeId, Option<Role>> = HashMap::new();
        for employee in &snapshot.employees {
            if roles
                .insert(employee.id, Role::from_function(&employee.function))
                .is_some()
            {
                return Err(ContextError::DuplicateEmployee(employee.id));
            }
        }

        let mut quota: HashMap<EmployeeId, BTreeMap<CapacityType, u32>> = HashMap::new();
        for capacity in &snapshot.capacities {
            quota
                .entry(capacity.employee_id)
                .or_default()
                .insert(capacity.capacity_type, capacity.max_count);
        }

        // Planable employees: a role and a non-zero total quota, in id order.
        let mut rows = snapshot.employees;
        rows.sort_by_key(|e| e.id);
        let mut employees = Vec::new();
        let mut employee_index = HashMap::new();
        for employee in rows {
            let Some(role) = roles[&employee.id] else {
                continue;
            };
            let mut capacities = quota.remove(&employee.id).unwrap_or_default();
            for capacity_type in CapacityType::ALL {
                capacities.entry(capacity_type).or_insert(0);
            }
            if capacities.values().sum::<u32>() == 0 {
                continue;
            }
            employee_index.insert(employee.id, employees.len());
            employees.push(PlannedEmployee {
                employee,
                role,
                capacities,
            });
        }

        // Window instances, validated and in calendar order.
        let mut instances = snapshot.instances;
        instances.sort_by_key(|i| (i.date, i.id));
        let mut instance_index = HashMap::new();
        for (position, instance) in instances.iter().enumerate() {
            let definition = definitions.get(&instance.definition_id).ok_or(
                ContextError::UnknownDefinition {
                    instance: instance.id,
                    definition: instance.definition_id,
                },
            )?;
            if !window.contains(instance.date) {
                return Err(ContextError::InstanceOutsideWindow {
                    instance: instance.id,
                    date: instance.date,
                });
            }
            if instance.month != month_tag(instance.date) {
                return Err(ContextError::MonthTagMismatch {
                    instance: instance.id,
                    tag: instance.month.clone(),
                    date: instance.date,
                });
            }
            if instance.calendar_week != instance.date.iso_week().week() {
                return Err(ContextError::WeekTagMismatch {
                    instance: instance.id,
                    tag: instance.calendar_week,
                    date: instance.date,
                });
            }
            if definition.is_weekend != instance.falls_on_weekend() {
                return Err(ContextError::WeekendDateMismatch {
                    instance: instance.id,
                    date: instance.date,
                });
            }
            if instance_index.insert(instance.id, position).is_some() {
                return Err(ContextError::DuplicateInstance(instance.id));
            }
        }

        // Existing assignments: context rows outside the planning month are
        // always fixed; planning-month rows are fixed under RESPECT, and
        // under OVERWRITE only when placed manually.
        let mut fixed = BTreeSet::new();
        for assignment in &snapshot.assignments {
            let position = *instance_index.get(&assignment.shift_instance_id).ok_or(
                ContextError::UnknownInstance {
                    assignment: assignment.id,
                    instance: assignment.shift_instance_id,
                },
            )?;
            let in_planning_month = window.in_planning_month(instances[position].date);
            let is_fixed = !in_planning_month
                || policy == MergePolicy::Respect
                || assignment.source == AssignmentSource::Manual;
            if !is_fixed {
                continue;
            }
            match employee_index.get(&assignment.employee_id) {
                Some(employee_position) => {
                    fixed.insert((*employee_position, position));
                }
                None => match roles.get(&assignment.employee_id) {
                    None => {
                        return Err(ContextError::UnknownEmployee {
                            assignment: assignment.id,
                            employee: assignment.employee_id,
                        })
                    }
                    Some(None) => {
                        return Err(ContextError::UnplanableAssignee {
                            assignment: assignment.id,
                            employee: assignment.employee_id,
                        })
                    }
                    // Planable but currently without quota: the row stays in
                    // the store as context, the model leaves it out.
                    Some(Some(_)) => {}
                },
            }
        }

        debug!(
            month = %window.month,
            employees = employees.len(),
            instances = instances.len(),
            fixed = fixed.len(),
            absences = snapshot.absences.len(),
            "planning context assembled"
        );

        Ok(PlanningContext {
            window,
            policy,
            employees,
            instances,
            definitions,
            fixed,
            absences: snapshot.absences,
            employee_index,
            instance_index,
        })
    }

    pub fn definition_of(&self, instance: &ShiftInstance) -> &ShiftDefinition {
        &self.definitions[&instance.definition_id]
    }

    pub fn employee_position(&self, id: EmployeeId) -> Option<usize> {
        self.employee_index.get(&id).copied()
    }

    pub fn instance_position(&self, id: ShiftInstanceId) -> Option<usize> {
        self.instance_index.get(&id).copied()
    }

    pub fn is_absent(&self, employee: usize, date: NaiveDate) -> bool {
        self.absences
            .contains(&(self.employees[employee].employee.id, date))
    }
}
