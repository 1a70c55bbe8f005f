//! Week-over-week rotation penalties.
//!
//! The roster should breathe: at most one weekday on-call per week, no
//! employee on the same weekend family two weeks running, weekend on-call
//! alternating between DAY and NIGHT, and a free Monday after a worked
//! weekend. Everything here is soft; each violation pays its weight once
//! per employee and week pair.
//!
//! Weeks are keyed by their ISO Monday, so "consecutive" is exactly seven
//! days apart and year boundaries need no care.

use chrono::{Duration, NaiveDate};
use good_lp::Variable;
use std::collections::{BTreeMap, HashMap};

use crate::compiler::RosterCompiler;
use crate::context::week_monday;
use crate::types::{Role, ShiftCategory, TimeOfDay};

#[derive(Default, Clone)]
struct WeekBucket {
    rb_weekday: Vec<Variable>,
    /// Weekday on-call variables falling on this week's Monday itself.
    monday_rb_weekday: Vec<Variable>,
    aw: Vec<Variable>,
    rb_weekend: Vec<Variable>,
    weekend_any: Vec<Variable>,
    rb_weekend_nursing_day: Vec<Variable>,
    rb_weekend_nursing_night: Vec<Variable>,
}

pub(crate) fn apply(c: &mut RosterCompiler) {
    let ctx = c.ctx;
    let employee_count = ctx.employees.len();

    // Pass 1: classify every candidate variable by employee and week.
    let mut plans: Vec<BTreeMap<NaiveDate, WeekBucket>> = vec![BTreeMap::new(); employee_count];
    for (e, plan) in plans.iter_mut().enumerate() {
        for &(s, var) in &c.by_employee[e] {
            let instance = &ctx.instances[s];
            let definition = ctx.definition_of(instance);
            let bucket = plan.entry(week_monday(instance.date)).or_default();
            match definition.category {
                ShiftCategory::RbWeekday => {
                    bucket.rb_weekday.push(var);
                    if instance.date == week_monday(instance.date) {
                        bucket.monday_rb_weekday.push(var);
                    }
                }
                ShiftCategory::Aw => {
                    bucket.aw.push(var);
                    bucket.weekend_any.push(var);
                }
                ShiftCategory::RbWeekend => {
                    bucket.rb_weekend.push(var);
                    bucket.weekend_any.push(var);
                    if definition.role == Role::Nursing {
                        match definition.time_of_day {
                            TimeOfDay::Day => bucket.rb_weekend_nursing_day.push(var),
                            TimeOfDay::Night => bucket.rb_weekend_nursing_night.push(var),
                            TimeOfDay::None => {}
                        }
                    }
                }
            }
        }
    }

    // Pass 2: the repeated-weekday penalty, and one "held any shift of this
    // family" indicator per employee and week for the pairwise penalties
    // below.
    let mut aw_held: HashMap<(usize, NaiveDate), Variable> = HashMap::new();
    let mut rb_held: HashMap<(usize, NaiveDate), Variable> = HashMap::new();
    let mut day_held: HashMap<(usize, NaiveDate), Variable> = HashMap::new();
    let mut night_held: HashMap<(usize, NaiveDate), Variable> = HashMap::new();
    let mut weekend_held: HashMap<(usize, NaiveDate), Variable> = HashMap::new();
    let mut monday_held: HashMap<(usize, NaiveDate), Variable> = HashMap::new();

    for (e, plan) in plans.iter().enumerate() {
        for (&week, bucket) in plan {
            if bucket.rb_weekday.len() >= 2 {
                let twice = c.at_least_two(&bucket.rb_weekday);
                c.objective += c.weights.rb_weekday_per_week * twice;
            }
            if !bucket.aw.is_empty() {
                aw_held.insert((e, week), c.any_of(&bucket.aw));
            }
            if !bucket.rb_weekend.is_empty() {
                rb_held.insert((e, week), c.any_of(&bucket.rb_weekend));
            }
            if !bucket.rb_weekend_nursing_day.is_empty() {
                day_held.insert((e, week), c.any_of(&bucket.rb_weekend_nursing_day));
            }
            if !bucket.rb_weekend_nursing_night.is_empty() {
                night_held.insert((e, week), c.any_of(&bucket.rb_weekend_nursing_night));
            }
            if !bucket.weekend_any.is_empty() {
                weekend_held.insert((e, week), c.any_of(&bucket.weekend_any));
            }
            if !bucket.monday_rb_weekday.is_empty() {
                monday_held.insert((e, week), c.any_of(&bucket.monday_rb_weekday));
            }
        }
    }

    // Pass 3: consecutive-week pairs.
    for (e, plan) in plans.iter().enumerate() {
        for &week in plan.keys() {
            let next = week + Duration::days(7);

            // Same weekend family two weeks running.
            if let (Some(&a), Some(&b)) = (aw_held.get(&(e, week)), aw_held.get(&(e, next))) {
                let repeat = c.and_pair(a, b);
                c.objective += c.weights.weekend_rotation * repeat;
            }
            if let (Some(&a), Some(&b)) = (rb_held.get(&(e, week)), rb_held.get(&(e, next))) {
                let repeat = c.and_pair(a, b);
                c.objective += c.weights.weekend_rotation * repeat;
            }

            // Repeated DAY, repeated NIGHT.
            if let (Some(&a), Some(&b)) = (day_held.get(&(e, week)), day_held.get(&(e, next))) {
                let repeat = c.and_pair(a, b);
                c.objective += c.weights.day_night_alternation * repeat;
            }
            if let (Some(&a), Some(&b)) = (night_held.get(&(e, week)), night_held.get(&(e, next)))
            {
                let repeat = c.and_pair(a, b);
                c.objective += c.weights.day_night_alternation * repeat;
            }

            // Worked weekend, then weekday on-call on the very next Monday
            // (the Monday of the following ISO week).
            if let (Some(&worked), Some(&monday)) =
                (weekend_held.get(&(e, week)), monday_held.get(&(e, next)))
            {
                let tired = c.and_pair(worked, monday);
                c.objective += c.weights.post_weekend_monday * tired;
            }
        }
    }
}
