//! One shift per employee and calendar day, across the whole window.

use chrono::NaiveDate;
use good_lp::{constraint, Expression, Variable};
use std::collections::BTreeMap;

use crate::compiler::RosterCompiler;

pub(crate) fn apply(c: &mut RosterCompiler) {
    let ctx = c.ctx;

    for e in 0..ctx.employees.len() {
        let mut per_day: BTreeMap<NaiveDate, Vec<Variable>> = BTreeMap::new();
        for &(s, var) in &c.by_employee[e] {
            per_day.entry(ctx.instances[s].date).or_default().push(var);
        }

        for (_, vars) in per_day {
            if vars.len() < 2 {
                continue;
            }
            let mut sum = Expression::from(0);
            for var in vars {
                sum += var;
            }
            c.constraints.push(constraint!(sum <= 1.0));
        }
    }
}
