//! Monthly quotas.
//!
//! Only planning-month assignments count against a quota; previous-month
//! and tail-day context never does. Without overplanning each bucket is a
//! hard cap. With overplanning the caps dissolve into soft overage terms
//! for every bucket with a positive quota.

use good_lp::{constraint, variable, Expression, Variable};
use std::collections::BTreeMap;

use crate::compiler::RosterCompiler;
use crate::types::CapacityType;

pub(crate) fn apply(c: &mut RosterCompiler) {
    let ctx = c.ctx;

    for e in 0..ctx.employees.len() {
        let mut buckets: BTreeMap<CapacityType, Vec<Variable>> = BTreeMap::new();
        for &(s, var) in &c.by_employee[e] {
            let instance = &ctx.instances[s];
            if !ctx.window.in_planning_month(instance.date) {
                continue;
            }
            let definition = ctx.definition_of(instance);
            for capacity_type in CapacityType::ALL {
                if capacity_type.matches(definition) {
                    buckets.entry(capacity_type).or_default().push(var);
                }
            }
        }

        for (capacity_type, vars) in buckets {
            let max_count = f64::from(ctx.employees[e].capacity(capacity_type));
            let mut sum = Expression::from(0);
            for var in &vars {
                sum += *var;
            }

            if !c.allow_overplanning {
                c.constraints.push(constraint!(sum <= max_count));
            } else if max_count >= 1.0 {
                let over = c
                    .vars
                    .add(variable().integer().min(0.0).max(vars.len() as f64));
                let rhs = sum - max_count;
                c.constraints.push(constraint!(over >= rhs));
                c.objective += c.weights.overplanning_overage * over;
            }
        }
    }
}
