//! Solver driver.
//!
//! Hands the compiled model to the MILP engine, maps the outcome to a
//! status, and resolves set variables back into `(employee id, shift
//! instance id)` pairs. The engine is exact: a finished run is OPTIMAL, an
//! unsatisfiable model INFEASIBLE. A positive time limit bounds the wall
//! clock; the engine keeps no intermediate incumbents, so an expired limit
//! reports UNKNOWN with no assignments.

use good_lp::{default_solver, ResolutionError, Solution, SolverModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::compiler::RosterModel;
use crate::types::{EmployeeId, ShiftInstanceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    ModelInvalid,
    Unknown,
}

impl SolveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "OPTIMAL",
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::ModelInvalid => "MODEL_INVALID",
            SolveStatus::Unknown => "UNKNOWN",
        }
    }

    /// True when the outcome carries an assignment list worth persisting.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective_value: f64,
    /// `(employee id, shift instance id)` pairs set to 1 in the best
    /// solution, in ascending order.
    pub assignments: Vec<(EmployeeId, ShiftInstanceId)>,
}

impl SolveOutcome {
    fn without_solution(status: SolveStatus) -> Self {
        SolveOutcome {
            status,
            objective_value: 0.0,
            assignments: Vec::new(),
        }
    }
}

pub fn solve(model: RosterModel, time_limit_seconds: Option<f64>) -> SolveOutcome {
    if !model.unfillable.is_empty() {
        debug!(
            instances = ?model.unfillable,
            "full cover demanded but instances have no candidates"
        );
        return SolveOutcome::without_solution(SolveStatus::Infeasible);
    }
    if model.pairs.is_empty() {
        // Nothing to decide; the constant objective is trivially optimal.
        return SolveOutcome::without_solution(SolveStatus::Optimal);
    }

    let RosterModel {
        variables,
        constraints,
        objective,
        pairs,
        ..
    } = model;

    type Solved = Result<(f64, Vec<(EmployeeId, ShiftInstanceId)>), ResolutionError>;
    let run = move || -> Solved {
        let mut problem = variables.minimise(objective.clone()).using(default_solver);
        for constraint in constraints {
            problem = problem.with(constraint);
        }
        let solution = problem.solve()?;
        let objective_value = solution.eval(objective.clone());
        let chosen = pairs
            .iter()
            .filter(|&&(_, _, var)| solution.value(var) > 0.5)
            .map(|&(employee, instance, _)| (employee, instance))
            .collect();
        Ok((objective_value, chosen))
    };

    let solved = match time_limit_seconds {
        Some(limit) if limit > 0.0 && limit.is_finite() => {
            let (sender, receiver) = mpsc::channel();
            thread::spawn(move || {
                let _ = sender.send(run());
            });
            match receiver.recv_timeout(Duration::from_secs_f64(limit)) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => {
                    debug!(limit, "time limit exhausted without a solution");
                    return SolveOutcome::without_solution(SolveStatus::Unknown);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("solver worker died before reporting");
                    return SolveOutcome::without_solution(SolveStatus::ModelInvalid);
                }
            }
        }
        _ => run(),
    };

    match solved {
        Ok((objective_value, mut assignments)) => {
            assignments.sort_unstable();
            debug!(
                assignments = assignments.len(),
                objective_value, "solver finished"
            );
            SolveOutcome {
                status: SolveStatus::Optimal,
                objective_value,
                assignments,
            }
        }
        Err(ResolutionError::Infeasible) => {
            SolveOutcome::without_solution(SolveStatus::Infeasible)
        }
        Err(err) => {
            debug!(error = %err, "engine rejected the model");
            SolveOutcome::without_solution(SolveStatus::ModelInvalid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{PenaltyWeights, RosterCompiler};
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

    fn nurse(id: i64, area: Area) -> Employee {
        Employee {
            id,
            given_name: "Pia".into(),
            family_name: format!("Probe{id}"),
            function: "Pflegefachkraft".into(),
            area: Some(area),
        }
    }

    fn definition(
        id: i64,
        category: ShiftCategory,
        role: Role,
        area: Area,
        time_of_day: TimeOfDay,
    ) -> ShiftDefinition {
        ShiftDefinition {
            id,
            category,
            role,
            area,
            time_of_day,
            is_weekday: !category.is_weekend(),
            is_weekend: category.is_weekend(),
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

    /// March 2025; Mon 2025-03-03 through Fri 2025-03-07 are weekdays,
    /// 2025-03-08/09 the following weekend.
    fn march_window() -> PlanningWindow {
        PlanningWindow::for_dates(date(2025, 3, 1), date(2025, 3, 31)).unwrap()
    }

    fn weekday_week_snapshot(max_count: u32) -> Snapshot {
        Snapshot {
            employees: vec![nurse(1, Area::Nord)],
            definitions: vec![definition(
                10,
                ShiftCategory::RbWeekday,
                Role::Nursing,
                Area::Nord,
                TimeOfDay::None,
            )],
            instances: (0..5)
                .map(|i| instance(100 + i, 10, date(2025, 3, 3 + i as u32)))
                .collect(),
            capacities: vec![capacity(1, CapacityType::RbNursingWeekday, max_count)],
            ..Snapshot::default()
        }
    }

    fn solve_snapshot(snapshot: Snapshot, allow_overplanning: bool) -> SolveOutcome {
        let ctx =
            PlanningContext::assemble(march_window(), MergePolicy::Respect, snapshot).unwrap();
        solve_context(&ctx, allow_overplanning)
    }

    fn solve_context(ctx: &PlanningContext, allow_overplanning: bool) -> SolveOutcome {
        let model = RosterCompiler::new(ctx, allow_overplanning, PenaltyWeights::default())
            .compile();
        solve(model, None)
    }

    #[test]
    fn trivial_cover_fills_every_weekday() {
        let outcome = solve_snapshot(weekday_week_snapshot(5), false);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.assignments.len(), 5);
        assert!(outcome.assignments.iter().all(|&(e, _)| e == 1));
        // Five fills minus one repeated-weekday penalty.
        assert!((outcome.objective_value + 4900.0).abs() < 1e-6);
    }

    #[test]
    fn capacity_leaves_shifts_open() {
        let outcome = solve_snapshot(weekday_week_snapshot(3), false);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.assignments.len(), 3);
    }

    #[test]
    fn overplanning_forces_full_cover_and_pays_overage() {
        let outcome = solve_snapshot(weekday_week_snapshot(3), true);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.assignments.len(), 5);
        // Five fills, one repeated-weekday penalty, two units of overage.
        assert!((outcome.objective_value + 4500.0).abs() < 1e-6);
    }

    #[test]
    fn absence_blocks_the_day() {
        let mut snapshot = weekday_week_snapshot(5);
        let wednesday = date(2025, 3, 5);
        snapshot.absences.insert((1, wednesday));
        let ctx =
            PlanningContext::assemble(march_window(), MergePolicy::Respect, snapshot).unwrap();
        let outcome = solve_context(&ctx, false);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.assignments.len(), 4);
        let wednesday_instance = ctx
            .instances
            .iter()
            .find(|i| i.date == wednesday)
            .unwrap()
            .id;
        assert!(outcome
            .assignments
            .iter()
            .all(|&(_, s)| s != wednesday_instance));
    }

    #[test]
    fn aw_weekend_stays_with_one_employee() {
        let snapshot = Snapshot {
            employees: vec![nurse(1, Area::Nord), nurse(2, Area::Nord)],
            definitions: vec![definition(
                20,
                ShiftCategory::Aw,
                Role::Nursing,
                Area::Sued,
                TimeOfDay::None,
            )],
            instances: vec![
                instance(200, 20, date(2025, 3, 8)),
                instance(201, 20, date(2025, 3, 9)),
            ],
            capacities: vec![
                capacity(1, CapacityType::AwNursing, 2),
                capacity(2, CapacityType::AwNursing, 2),
            ],
            ..Snapshot::default()
        };
        let outcome = solve_snapshot(snapshot, false);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.assignments.len(), 2);
        let holders: Vec<i64> = outcome.assignments.iter().map(|&(e, _)| e).collect();
        assert_eq!(holders[0], holders[1], "Saturday and Sunday must match");
    }

    #[test]
    fn weekend_on_call_never_mixes_day_and_night() {
        let snapshot = Snapshot {
            employees: vec![nurse(1, Area::Nord)],
            definitions: vec![
                definition(
                    30,
                    ShiftCategory::RbWeekend,
                    Role::Nursing,
                    Area::Nord,
                    TimeOfDay::Day,
                ),
                definition(
                    31,
                    ShiftCategory::RbWeekend,
                    Role::Nursing,
                    Area::Nord,
                    TimeOfDay::Night,
                ),
            ],
            instances: vec![
                instance(300, 30, date(2025, 3, 8)),
                instance(301, 30, date(2025, 3, 9)),
                instance(310, 31, date(2025, 3, 8)),
                instance(311, 31, date(2025, 3, 9)),
            ],
            capacities: vec![capacity(1, CapacityType::RbNursingWeekend, 2)],
            ..Snapshot::default()
        };
        let outcome = solve_snapshot(snapshot, false);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        // One shift per day and coupled weekends leave exactly one
        // time-of-day pair for the single nurse.
        assert_eq!(outcome.assignments.len(), 2);
        let taken: Vec<i64> = outcome.assignments.iter().map(|&(_, s)| s).collect();
        assert!(taken == vec![300, 301] || taken == vec![310, 311], "{taken:?}");
    }

    #[test]
    fn conflicting_fixed_assignments_are_infeasible() {
        let monday = date(2025, 3, 3);
        let snapshot = Snapshot {
            employees: vec![nurse(1, Area::Nord)],
            definitions: vec![
                definition(
                    10,
                    ShiftCategory::RbWeekday,
                    Role::Nursing,
                    Area::Nord,
                    TimeOfDay::None,
                ),
                definition(
                    11,
                    ShiftCategory::RbWeekday,
                    Role::Nursing,
                    Area::Sued,
                    TimeOfDay::None,
                ),
            ],
            instances: vec![instance(100, 10, monday), instance(110, 11, monday)],
            capacities: vec![capacity(1, CapacityType::RbNursingWeekday, 5)],
            assignments: vec![
                Assignment {
                    id: 1,
                    employee_id: 1,
                    shift_instance_id: 100,
                    source: AssignmentSource::Manual,
                },
                Assignment {
                    id: 2,
                    employee_id: 1,
                    shift_instance_id: 110,
                    source: AssignmentSource::Manual,
                },
            ],
            ..Snapshot::default()
        };
        let outcome = solve_snapshot(snapshot, false);
        assert_eq!(outcome.status, SolveStatus::Infeasible);
        assert!(outcome.assignments.is_empty());
        assert_eq!(outcome.objective_value, 0.0);
    }

    #[test]
    fn area_preference_steers_assignment() {
        let snapshot = Snapshot {
            employees: vec![nurse(1, Area::Nord), nurse(2, Area::Sued)],
            definitions: vec![definition(
                12,
                ShiftCategory::RbWeekday,
                Role::Nursing,
                Area::Sued,
                TimeOfDay::None,
            )],
            instances: vec![instance(120, 12, date(2025, 3, 4))],
            capacities: vec![
                capacity(1, CapacityType::RbNursingWeekday, 5),
                capacity(2, CapacityType::RbNursingWeekday, 5),
            ],
            ..Snapshot::default()
        };
        let outcome = solve_snapshot(snapshot, false);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.assignments, vec![(2, 120)]);
    }

    #[test]
    fn time_limit_leaves_small_models_untouched() {
        let outcome = {
            let ctx = PlanningContext::assemble(
                march_window(),
                MergePolicy::Respect,
                weekday_week_snapshot(5),
            )
            .unwrap();
            let model =
                RosterCompiler::new(&ctx, false, PenaltyWeights::default()).compile();
            solve(model, Some(30.0))
        };
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.assignments.len(), 5);
    }

    #[test]
    fn empty_context_is_trivially_optimal() {
        let ctx = PlanningContext::assemble(
            march_window(),
            MergePolicy::Respect,
            Snapshot::default(),
        )
        .unwrap();
        let outcome = solve_context(&ctx, false);
        assert_eq!(outcome.status, SolveStatus::Optimal);
        assert_eq!(outcome.objective_value, 0.0);
        assert!(outcome.assignments.is_empty());
    }
}
