//! Weekend fairness and area preference.
//!
//! The fairness target is the floor of the planning month's weekend shifts
//! divided by the planable head count; every weekend assignment beyond that
//! share pays the fairness weight through a non-negative slack. Employees
//! with a known home area pay the area weight for every shift in the other
//! area; Mitte shifts take anyone and are never penalised.

use good_lp::{constraint, variable, Expression, Variable};

use crate::compiler::RosterCompiler;
use crate::types::Area;

pub(crate) fn apply(c: &mut RosterCompiler) {
    let ctx = c.ctx;

    // Area preference: a plain coefficient on the decision variable.
    let mut out_of_area: Vec<Variable> = Vec::new();
    for e in 0..ctx.employees.len() {
        let Some(home) = ctx.employees[e].employee.area else {
            continue;
        };
        for &(s, var) in &c.by_employee[e] {
            let shift_area = ctx.definition_of(&ctx.instances[s]).area;
            if shift_area != Area::Mitte && shift_area != home {
                out_of_area.push(var);
            }
        }
    }
    for var in out_of_area {
        c.objective += c.weights.area_preference * var;
    }

    // Weekend share.
    if ctx.employees.is_empty() {
        return;
    }
    let weekend_total = ctx
        .instances
        .iter()
        .filter(|i| {
            ctx.window.in_planning_month(i.date) && ctx.definition_of(i).category.is_weekend()
        })
        .count();
    let target = (weekend_total / ctx.employees.len()) as f64;

    for e in 0..ctx.employees.len() {
        let weekend_vars: Vec<Variable> = c.by_employee[e]
            .iter()
            .filter(|&&(s, _)| {
                let instance = &ctx.instances[s];
                ctx.window.in_planning_month(instance.date)
                    && ctx.definition_of(instance).category.is_weekend()
            })
            .map(|&(_, var)| var)
            .collect();
        if (weekend_vars.len() as f64) <= target {
            continue;
        }

        let mut count = Expression::from(0);
        for var in &weekend_vars {
            count += *var;
        }
        let excess = c
            .vars
            .add(variable().integer().min(0.0).max(weekend_vars.len() as f64));
        let rhs = count - target;
        c.constraints.push(constraint!(excess >= rhs));
        c.objective += c.weights.weekend_fairness * excess;
    }
}
