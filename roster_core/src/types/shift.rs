use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{Area, Role, ShiftDefinitionId, ShiftInstanceId};

/// Duty category of a shift definition.
///
/// `RbWeekday` and `RbWeekend` are on-call duties (reachable by phone),
/// `Aw` is the weekend on-site service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftCategory {
    RbWeekday,
    RbWeekend,
    Aw,
}

impl ShiftCategory {
    pub fn is_weekend(&self) -> bool {
        matches!(self, ShiftCategory::RbWeekend | ShiftCategory::Aw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftCategory::RbWeekday => "RB_WEEKDAY",
            ShiftCategory::RbWeekend => "RB_WEEKEND",
            ShiftCategory::Aw => "AW",
        }
    }

    pub fn parse(raw: &str) -> Option<ShiftCategory> {
        match raw {
            "RB_WEEKDAY" => Some(ShiftCategory::RbWeekday),
            "RB_WEEKEND" => Some(ShiftCategory::RbWeekend),
            "AW" => Some(ShiftCategory::Aw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    Day,
    Night,
    None,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "DAY",
            TimeOfDay::Night => "NIGHT",
            TimeOfDay::None => "NONE",
        }
    }

    pub fn parse(raw: &str) -> Option<TimeOfDay> {
        match raw {
            "DAY" => Some(TimeOfDay::Day),
            "NIGHT" => Some(TimeOfDay::Night),
            "NONE" => Some(TimeOfDay::None),
            _ => None,
        }
    }
}

/// A recurring duty template. Seeded once, immutable in practice.
///
/// The tuple (category, role, area, time_of_day) is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: ShiftDefinitionId,
    pub category: ShiftCategory,
    pub role: Role,
    pub area: Area,
    pub time_of_day: TimeOfDay,
    pub is_weekday: bool,
    pub is_weekend: bool,
}

impl ShiftDefinition {
    /// The weekday/weekend flags must agree with the category:
    /// RB_WEEKDAY implies weekday, RB_WEEKEND and AW imply weekend.
    pub fn flags_consistent(&self) -> bool {
        self.is_weekday != self.is_weekend && self.is_weekend == self.category.is_weekend()
    }
}

/// The realisation of a definition on a specific date.
///
/// `calendar_week` is the ISO-8601 week number and `month` the `YYYY-MM`
/// tag, both derived from `date` when the instance is generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftInstance {
    pub id: ShiftInstanceId,
    pub definition_id: ShiftDefinitionId,
    pub date: NaiveDate,
    pub calendar_week: u32,
    pub month: String,
}

impl ShiftInstance {
    pub fn falls_on_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Canonical `YYYY-MM` tag of a date.
pub fn month_tag(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(category: ShiftCategory, is_weekday: bool, is_weekend: bool) -> ShiftDefinition {
        ShiftDefinition {
            id: 1,
            category,
            role: Role::Nursing,
            area: Area::Nord,
            time_of_day: TimeOfDay::None,
            is_weekday,
            is_weekend,
        }
    }

    #[test]
    fn flag_consistency_follows_category() {
        assert!(definition(ShiftCategory::RbWeekday, true, false).flags_consistent());
        assert!(definition(ShiftCategory::RbWeekend, false, true).flags_consistent());
        assert!(definition(ShiftCategory::Aw, false, true).flags_consistent());
        assert!(!definition(ShiftCategory::RbWeekday, false, true).flags_consistent());
        assert!(!definition(ShiftCategory::Aw, true, true).flags_consistent());
    }

    #[test]
    fn month_tag_is_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(month_tag(d), "2025-03");
    }

    #[test]
    fn category_round_trips_through_text() {
        for c in [ShiftCategory::RbWeekday, ShiftCategory::RbWeekend, ShiftCategory::Aw] {
            assert_eq!(ShiftCategory::parse(c.as_str()), Some(c));
        }
        assert_eq!(ShiftCategory::parse("RB"), None);
    }
}
