//! Constraint compiler.
//!
//! Translates a [`PlanningContext`](crate::context::PlanningContext) into a
//! mixed-integer model: one binary decision variable per candidate
//! `(employee, shift instance)` pair, hard constraints for coverage, daily
//! exclusivity, quotas, fixed assignments and weekend coupling, and a
//! weighted soft-penalty objective for rotation, fairness and area
//! preference. Auxiliary indicator Booleans are linked to the decision
//! variables through linear inequalities only; there is no Boolean
//! multiplication anywhere in the model.

pub mod constraints;

use good_lp::{constraint, variable, variables, Constraint, Expression, ProblemVariables, Variable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::context::PlanningContext;
use crate::types::{EmployeeId, ShiftInstanceId};

use constraints::{capacity, coupling, coverage, daily, fairness, rotation};

/// Penalty weights of the soft constraints. All tunable by the caller;
/// the defaults keep the fill incentive dominant over every penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyWeights {
    /// More than one weekday on-call in the same week.
    pub rb_weekday_per_week: f64,
    /// Same weekend family (AW or weekend on-call) in consecutive weeks.
    pub weekend_rotation: f64,
    /// Repeated DAY or repeated NIGHT weekend on-call in consecutive weeks.
    pub day_night_alternation: f64,
    /// Weekend assignments beyond the per-employee share.
    pub weekend_fairness: f64,
    /// Weekday on-call on the Monday right after a worked weekend.
    pub post_weekend_monday: f64,
    /// Assignment outside the employee's own area (Mitte excepted).
    pub area_preference: f64,
    /// Assignments beyond quota when overplanning is permitted.
    pub overplanning_overage: f64,
    /// Reward per filled shift; dominates all penalties.
    pub fill_bonus: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        PenaltyWeights {
            rb_weekday_per_week: 100.0,
            weekend_rotation: 80.0,
            day_night_alternation: 60.0,
            weekend_fairness: 50.0,
            post_weekend_monday: 70.0,
            area_preference: 40.0,
            overplanning_overage: 200.0,
            fill_bonus: 1000.0,
        }
    }
}

/// The compiled model, ready for the solver driver.
pub struct RosterModel {
    pub(crate) variables: ProblemVariables,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expression,
    /// Every decision variable with the ids it stands for, in deterministic
    /// `(instance id, employee id)` order.
    pub(crate) pairs: Vec<(EmployeeId, ShiftInstanceId, Variable)>,
    /// Planning-month instances without any candidate while full cover was
    /// demanded. A non-empty list makes the model trivially infeasible.
    pub(crate) unfillable: Vec<ShiftInstanceId>,
}

impl RosterModel {
    pub fn variable_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn unfillable_instances(&self) -> &[ShiftInstanceId] {
        &self.unfillable
    }
}

/// Builds the model in numbered steps, one constraint family per module.
pub struct RosterCompiler<'a> {
    pub(crate) ctx: &'a PlanningContext,
    pub(crate) weights: PenaltyWeights,
    pub(crate) allow_overplanning: bool,
    pub(crate) vars: ProblemVariables,
    /// `(employee index, instance index)` → decision variable.
    pub(crate) x: HashMap<(usize, usize), Variable>,
    /// Instance index → candidates `(employee index, variable)`.
    pub(crate) by_instance: Vec<Vec<(usize, Variable)>>,
    /// Employee index → candidacies `(instance index, variable)`.
    pub(crate) by_employee: Vec<Vec<(usize, Variable)>>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expression,
    pub(crate) unfillable: Vec<ShiftInstanceId>,
}

impl<'a> RosterCompiler<'a> {
    pub fn new(ctx: &'a PlanningContext, allow_overplanning: bool, weights: PenaltyWeights) -> Self {
        RosterCompiler {
            ctx,
            weights,
            allow_overplanning,
            vars: variables!(),
            x: HashMap::new(),
            by_instance: vec![Vec::new(); ctx.instances.len()],
            by_employee: vec![Vec::new(); ctx.employees.len()],
            constraints: Vec::new(),
            objective: Expression::from(0),
            unfillable: Vec::new(),
        }
    }

    pub fn compile(mut self) -> RosterModel {
        // 1. Binary decision variables for all candidate pairs
        self.allocate_variables();
        // 2. Coverage, fixed assignments and the fill incentive
        coverage::apply(&mut self);
        // 3. One shift per employee and day
        daily::apply(&mut self);
        // 4. Monthly quotas, hard caps or soft overage
        capacity::apply(&mut self);
        // 5. Weekend coupling and day/night mixing
        coupling::apply(&mut self);
        // 6. Week-over-week rotation penalties
        rotation::apply(&mut self);
        // 7. Weekend fairness and area preference
        fairness::apply(&mut self);

        debug!(
            variables = self.x.len(),
            constraints = self.constraints.len(),
            unfillable = self.unfillable.len(),
            "roster model compiled"
        );

        let ctx = self.ctx;
        let mut pairs: Vec<(EmployeeId, ShiftInstanceId, Variable)> = self
            .x
            .iter()
            .map(|(&(e, s), &var)| (ctx.employees[e].employee.id, ctx.instances[s].id, var))
            .collect();
        pairs.sort_by_key(|&(employee, instance, _)| (instance, employee));

        RosterModel {
            variables: self.vars,
            constraints: self.constraints,
            objective: self.objective,
            pairs,
            unfillable: self.unfillable,
        }
    }

    /// A variable exists where the roles match and the employee is not
    /// absent. Fixed pairs get one unconditionally: they are observed fact,
    /// and a conflict has to surface as infeasibility, not as a hole in the
    /// model.
    fn allocate_variables(&mut self) {
        let ctx = self.ctx;
        for (s, instance) in ctx.instances.iter().enumerate() {
            let definition = ctx.definition_of(instance);
            for (e, planned) in ctx.employees.iter().enumerate() {
                let candidate = planned.role == definition.role
                    && !ctx
                        .absences
                        .contains(&(planned.employee.id, instance.date));
                if !candidate && !ctx.fixed.contains(&(e, s)) {
                    continue;
                }
                let var = self.vars.add(variable().binary());
                self.x.insert((e, s), var);
                self.by_instance[s].push((e, var));
                self.by_employee[e].push((s, var));
            }
        }
    }

    pub(crate) fn add_binary(&mut self) -> Variable {
        self.vars.add(variable().binary())
    }

    /// Indicator linked in both directions: `aux = 1` iff any term is 1
    /// (`n·aux ≥ Σ` forces it up, `aux ≤ Σ` forces it down).
    pub(crate) fn any_of(&mut self, terms: &[Variable]) -> Variable {
        let aux = self.add_binary();
        let mut sum = Expression::from(0);
        for v in terms {
            sum += *v;
        }
        let scaled = (terms.len() as f64) * aux;
        self.constraints.push(constraint!(scaled >= sum.clone()));
        self.constraints.push(constraint!(aux <= sum));
        aux
    }

    /// Indicator forced to 1 once two or more of the terms are 1.
    /// Callers only invoke this with at least two terms.
    pub(crate) fn at_least_two(&mut self, terms: &[Variable]) -> Variable {
        let aux = self.add_binary();
        let mut sum = Expression::from(0);
        for v in terms {
            sum += *v;
        }
        let scaled = ((terms.len() - 1) as f64) * aux;
        let rhs = sum - 1.0;
        self.constraints.push(constraint!(scaled >= rhs));
        aux
    }

    /// Logical AND of two Booleans: `c ≤ a`, `c ≤ b`, `c ≥ a + b − 1`.
    pub(crate) fn and_pair(&mut self, a: Variable, b: Variable) -> Variable {
        let c = self.add_binary();
        self.constraints.push(constraint!(c <= a));
        self.constraints.push(constraint!(c <= b));
        let rhs = a + b - 1.0;
        self.constraints.push(constraint!(c >= rhs));
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{PlanningContext, PlanningWindow, Snapshot};
    use crate::types::shift::month_tag;
    use crate::types::{
        Area, Assignment, AssignmentSource, CapacityType, Employee, EmployeeCapacity,
        MergePolicy, Role, ShiftCategory, ShiftDefinition, ShiftInstance, TimeOfDay,
    };
    use chrono::{Datelike, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(id: i64, function: &str) -> Employee {
        Employee {
            id,
            given_name: "Kim".into(),
            family_name: format!("Kraft{id}"),
            function: function.into(),
            area: Some(Area::Nord),
        }
    }

    fn nursing_weekday_definition(id: i64) -> ShiftDefinition {
        ShiftDefinition {
            id,
            category: ShiftCategory::RbWeekday,
            role: Role::Nursing,
            area: Area::Nord,
            time_of_day: TimeOfDay::None,
            is_weekday: true,
            is_weekend: false,
        }
    }

    fn instance(id: i64, definition_id: i64, on: NaiveDate) -> ShiftInstance {
        ShiftInstance {
            id,
            definition_id,
            date: on,
            calendar_week: on.iso_week().week(),
            month: month_tag(on),
        }
    }

    fn capacity(employee_id: i64, capacity_type: CapacityType, max_count: u32) -> EmployeeCapacity {
        EmployeeCapacity {
            id: employee_id * 100 + capacity_type as i64,
            employee_id,
            capacity_type,
            max_count,
        }
    }

    fn assemble(snapshot: Snapshot) -> PlanningContext {
        let window = PlanningWindow::for_dates(date(2025, 3, 1), date(2025, 3, 31)).unwrap();
        PlanningContext::assemble(window, MergePolicy::Respect, snapshot).unwrap()
    }

    #[test]
    fn variables_require_matching_role() {
        let snapshot = Snapshot {
            employees: vec![employee(1, "Pflegefachkraft"), employee(2, "Arzt")],
            definitions: vec![nursing_weekday_definition(10)],
            instances: vec![instance(100, 10, date(2025, 3, 3))],
            capacities: vec![
                capacity(1, CapacityType::RbNursingWeekday, 3),
                capacity(2, CapacityType::RbDoctorsWeekday, 3),
            ],
            ..Snapshot::default()
        };
        let ctx = assemble(snapshot);
        let model = RosterCompiler::new(&ctx, false, PenaltyWeights::default()).compile();
        // Only the nurse is a candidate for the nursing shift.
        assert_eq!(model.variable_count(), 1);
    }

    #[test]
    fn absence_suppresses_the_variable() {
        let mut snapshot = Snapshot {
            employees: vec![employee(1, "Pflegefachkraft")],
            definitions: vec![nursing_weekday_definition(10)],
            instances: vec![instance(100, 10, date(2025, 3, 3))],
            capacities: vec![capacity(1, CapacityType::RbNursingWeekday, 3)],
            ..Snapshot::default()
        };
        snapshot.absences.insert((1, date(2025, 3, 3)));
        let ctx = assemble(snapshot);
        let model = RosterCompiler::new(&ctx, false, PenaltyWeights::default()).compile();
        assert_eq!(model.variable_count(), 0);
    }

    #[test]
    fn fixed_pairs_get_a_variable_even_when_absent() {
        let mut snapshot = Snapshot {
            employees: vec![employee(1, "Pflegefachkraft")],
            definitions: vec![nursing_weekday_definition(10)],
            instances: vec![instance(100, 10, date(2025, 3, 3))],
            capacities: vec![capacity(1, CapacityType::RbNursingWeekday, 3)],
            assignments: vec![Assignment {
                id: 1,
                employee_id: 1,
                shift_instance_id: 100,
                source: AssignmentSource::Manual,
            }],
            ..Snapshot::default()
        };
        snapshot.absences.insert((1, date(2025, 3, 3)));
        let ctx = assemble(snapshot);
        assert_eq!(ctx.fixed.len(), 1);
        let model = RosterCompiler::new(&ctx, false, PenaltyWeights::default()).compile();
        assert_eq!(model.variable_count(), 1);
    }

    #[test]
    fn overplanning_flags_instances_without_candidates() {
        let snapshot = Snapshot {
            employees: vec![employee(2, "Arzt")],
            definitions: vec![nursing_weekday_definition(10)],
            instances: vec![instance(100, 10, date(2025, 3, 3))],
            capacities: vec![capacity(2, CapacityType::RbDoctorsWeekday, 3)],
            ..Snapshot::default()
        };
        let ctx = assemble(snapshot);

        let relaxed = RosterCompiler::new(&ctx, false, PenaltyWeights::default()).compile();
        assert!(relaxed.unfillable_instances().is_empty());

        let strict = RosterCompiler::new(&ctx, true, PenaltyWeights::default()).compile();
        assert_eq!(strict.unfillable_instances(), &[100]);
    }
}
