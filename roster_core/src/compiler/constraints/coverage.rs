//! Coverage and fixed assignments.
//!
//! Every shift instance takes at most one employee; when overplanning is
//! permitted every planning-month instance must be filled. Fixed pairs from
//! the loader are forced in. The fill incentive also lives here: each
//! candidate variable earns the (dominant) fill bonus so the optimiser
//! covers everything it legally can.

use good_lp::{constraint, Expression};

use crate::compiler::RosterCompiler;

pub(crate) fn apply(c: &mut RosterCompiler) {
    let ctx = c.ctx;

    for &(e, s) in &ctx.fixed {
        let var = c.x[&(e, s)];
        c.constraints.push(constraint!(var == 1.0));
    }

    for s in 0..ctx.instances.len() {
        let candidates = c.by_instance[s].clone();
        let must_fill =
            c.allow_overplanning && ctx.window.in_planning_month(ctx.instances[s].date);

        if candidates.is_empty() {
            if must_fill {
                c.unfillable.push(ctx.instances[s].id);
            }
            continue;
        }

        let mut sum = Expression::from(0);
        for &(_, var) in &candidates {
            sum += var;
            c.objective += -c.weights.fill_bonus * var;
        }
        if must_fill {
            c.constraints.push(constraint!(sum == 1.0));
        } else {
            c.constraints.push(constraint!(sum <= 1.0));
        }
    }
}
