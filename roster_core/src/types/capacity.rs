use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, Role, ShiftCategory, ShiftDefinition, TimeOfDay};

/// Monthly quota bucket. A missing row is equivalent to `max_count = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityType {
    RbNursingWeekday,
    RbNursingWeekend,
    RbDoctorsWeekday,
    RbDoctorsWeekend,
    AwNursing,
}

impl CapacityType {
    pub const ALL: [CapacityType; 5] = [
        CapacityType::RbNursingWeekday,
        CapacityType::RbNursingWeekend,
        CapacityType::RbDoctorsWeekday,
        CapacityType::RbDoctorsWeekend,
        CapacityType::AwNursing,
    ];

    /// The capacity ↔ shift mapping as one table.
    ///
    /// `RbNursingWeekend` is the only type that aggregates DAY and NIGHT;
    /// every other type counts only shifts with `time_of_day = NONE`.
    pub fn matches(&self, definition: &ShiftDefinition) -> bool {
        let (category, role, time_of_day) = match self {
            CapacityType::RbNursingWeekday => {
                (ShiftCategory::RbWeekday, Role::Nursing, Some(TimeOfDay::None))
            }
            CapacityType::RbNursingWeekend => (ShiftCategory::RbWeekend, Role::Nursing, None),
            CapacityType::RbDoctorsWeekday => {
                (ShiftCategory::RbWeekday, Role::Doctor, Some(TimeOfDay::None))
            }
            CapacityType::RbDoctorsWeekend => {
                (ShiftCategory::RbWeekend, Role::Doctor, Some(TimeOfDay::None))
            }
            CapacityType::AwNursing => (ShiftCategory::Aw, Role::Nursing, Some(TimeOfDay::None)),
        };

        definition.category == category
            && definition.role == role
            && time_of_day.is_none_or(|t| definition.time_of_day == t)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityType::RbNursingWeekday => "RB_NURSING_WEEKDAY",
            CapacityType::RbNursingWeekend => "RB_NURSING_WEEKEND",
            CapacityType::RbDoctorsWeekday => "RB_DOCTORS_WEEKDAY",
            CapacityType::RbDoctorsWeekend => "RB_DOCTORS_WEEKEND",
            CapacityType::AwNursing => "AW_NURSING",
        }
    }

    pub fn parse(raw: &str) -> Option<CapacityType> {
        CapacityType::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

/// Per-employee monthly quota for one capacity type.
/// `(employee_id, capacity_type)` is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCapacity {
    pub id: i64,
    pub employee_id: EmployeeId,
    pub capacity_type: CapacityType,
    pub max_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Area;

    fn definition(
        category: ShiftCategory,
        role: Role,
        time_of_day: TimeOfDay,
    ) -> ShiftDefinition {
        ShiftDefinition {
            id: 1,
            category,
            role,
            area: Area::Nord,
            time_of_day,
            is_weekday: !category.is_weekend(),
            is_weekend: category.is_weekend(),
        }
    }

    #[test]
    fn weekend_nursing_counts_day_and_night_together() {
        let day = definition(ShiftCategory::RbWeekend, Role::Nursing, TimeOfDay::Day);
        let night = definition(ShiftCategory::RbWeekend, Role::Nursing, TimeOfDay::Night);
        assert!(CapacityType::RbNursingWeekend.matches(&day));
        assert!(CapacityType::RbNursingWeekend.matches(&night));
    }

    #[test]
    fn other_types_require_time_of_day_none() {
        let dated = definition(ShiftCategory::RbWeekday, Role::Nursing, TimeOfDay::Day);
        assert!(!CapacityType::RbNursingWeekday.matches(&dated));

        let plain = definition(ShiftCategory::RbWeekday, Role::Nursing, TimeOfDay::None);
        assert!(CapacityType::RbNursingWeekday.matches(&plain));
    }

    #[test]
    fn role_and_category_must_both_match() {
        let aw = definition(ShiftCategory::Aw, Role::Nursing, TimeOfDay::None);
        assert!(CapacityType::AwNursing.matches(&aw));
        assert!(!CapacityType::RbNursingWeekend.matches(&aw));
        assert!(!CapacityType::RbDoctorsWeekend.matches(&aw));

        let doctors = definition(ShiftCategory::RbWeekend, Role::Doctor, TimeOfDay::None);
        assert!(CapacityType::RbDoctorsWeekend.matches(&doctors));
        assert!(!CapacityType::RbNursingWeekend.matches(&doctors));
    }

    #[test]
    fn names_round_trip() {
        for c in CapacityType::ALL {
            assert_eq!(CapacityType::parse(c.as_str()), Some(c));
        }
        assert_eq!(CapacityType::parse("RB_NURSING"), None);
    }
}
