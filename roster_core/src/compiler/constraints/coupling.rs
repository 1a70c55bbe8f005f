//! Weekend coupling.
//!
//! A weekend belongs to one person: the Saturday and Sunday instance of an
//! AW nursing pair (keyed by week and area) and of a weekend on-call
//! nursing pair (keyed by week, area and time of day) must carry the same
//! employee. Modelled as per-employee equalities so per-instance coverage
//! counting stays simple. An employee holding a variable for only one side
//! of a complete pair is pinned to 0 there.
//!
//! Also here: no employee mixes a DAY and a NIGHT weekend on-call shift
//! within the same weekend.

use chrono::{Datelike, NaiveDate, Weekday};
use good_lp::constraint;
use std::collections::HashMap;

use crate::compiler::RosterCompiler;
use crate::context::week_monday;
use crate::types::{Area, Role, ShiftCategory, TimeOfDay};

type PairSlots = (Option<usize>, Option<usize>);

pub(crate) fn apply(c: &mut RosterCompiler) {
    let ctx = c.ctx;

    let mut aw_pairs: HashMap<(NaiveDate, Area), PairSlots> = HashMap::new();
    let mut rb_pairs: HashMap<(NaiveDate, Area, TimeOfDay), PairSlots> = HashMap::new();
    // Sat-DAY, Sat-NIGHT, Sun-DAY, Sun-NIGHT per week, nursing on-call only.
    let mut mixed_slots: HashMap<NaiveDate, [Vec<usize>; 4]> = HashMap::new();

    for (s, instance) in ctx.instances.iter().enumerate() {
        let definition = ctx.definition_of(instance);
        if definition.role != Role::Nursing {
            continue;
        }
        let saturday = match instance.date.weekday() {
            Weekday::Sat => true,
            Weekday::Sun => false,
            _ => continue,
        };
        let week = week_monday(instance.date);

        match definition.category {
            ShiftCategory::Aw => {
                let slots = aw_pairs.entry((week, definition.area)).or_default();
                if saturday {
                    slots.0 = Some(s);
                } else {
                    slots.1 = Some(s);
                }
            }
            ShiftCategory::RbWeekend => {
                let slots = rb_pairs
                    .entry((week, definition.area, definition.time_of_day))
                    .or_default();
                if saturday {
                    slots.0 = Some(s);
                } else {
                    slots.1 = Some(s);
                }

                let slot = match (saturday, definition.time_of_day) {
                    (true, TimeOfDay::Day) => Some(0),
                    (true, TimeOfDay::Night) => Some(1),
                    (false, TimeOfDay::Day) => Some(2),
                    (false, TimeOfDay::Night) => Some(3),
                    _ => None,
                };
                if let Some(slot) = slot {
                    mixed_slots.entry(week).or_default()[slot].push(s);
                }
            }
            ShiftCategory::RbWeekday => {}
        }
    }

    // A pair is coupled only when both days exist in the window; a lone
    // Saturday or Sunday (holiday gap) plans independently.
    let mut complete: Vec<(usize, usize)> = Vec::new();
    complete.extend(aw_pairs.values().filter_map(|&(a, b)| Some((a?, b?))));
    complete.extend(rb_pairs.values().filter_map(|&(a, b)| Some((a?, b?))));
    complete.sort_unstable();

    for (sat, sun) in complete {
        for e in 0..ctx.employees.len() {
            match (c.x.get(&(e, sat)).copied(), c.x.get(&(e, sun)).copied()) {
                (Some(a), Some(b)) => c.constraints.push(constraint!(a == b)),
                (Some(a), None) => c.constraints.push(constraint!(a == 0.0)),
                (None, Some(b)) => c.constraints.push(constraint!(b == 0.0)),
                (None, None) => {}
            }
        }
    }

    // Sat-DAY with Sun-NIGHT (and the reverse) excluded per employee.
    let mut crossings: Vec<(usize, usize)> = Vec::new();
    for slots in mixed_slots.values() {
        for &a in &slots[0] {
            for &b in &slots[3] {
                crossings.push((a, b));
            }
        }
        for &a in &slots[1] {
            for &b in &slots[2] {
                crossings.push((a, b));
            }
        }
    }
    crossings.sort_unstable();

    for (a, b) in crossings {
        for e in 0..ctx.employees.len() {
            if let (Some(&va), Some(&vb)) = (c.x.get(&(e, a)), c.x.get(&(e, b))) {
                c.constraints.push(constraint!(va + vb <= 1.0));
            }
        }
    }
}
