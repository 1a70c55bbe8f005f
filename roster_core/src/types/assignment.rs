use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::types::{AssignmentId, EmployeeId, ShiftInstanceId};

/// Origin of an assignment row. MANUAL rows are never rewritten by the
/// planner; SOLVER rows may be replaced under the OVERWRITE policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentSource {
    Solver,
    Manual,
}

impl AssignmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentSource::Solver => "SOLVER",
            AssignmentSource::Manual => "MANUAL",
        }
    }

    pub fn parse(raw: &str) -> Option<AssignmentSource> {
        match raw {
            "SOLVER" => Some(AssignmentSource::Solver),
            "MANUAL" => Some(AssignmentSource::Manual),
            _ => None,
        }
    }
}

/// An `(employee, shift_instance)` pairing in the store.
/// The pair is unique; the writer enforces it on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub shift_instance_id: ShiftInstanceId,
    pub source: AssignmentSource,
}

/// How existing planning-month assignments are merged with a new solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergePolicy {
    /// Keep every existing row; insert only missing pairs.
    Respect,
    /// Replace planning-month SOLVER rows; MANUAL rows are untouched.
    Overwrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown merge policy '{0}', expected RESPECT or OVERWRITE")]
pub struct ParsePolicyError(pub String);

impl FromStr for MergePolicy {
    type Err = ParsePolicyError;

    // Case-insensitive, callers pass the policy through verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RESPECT" => Ok(MergePolicy::Respect),
            "OVERWRITE" => Ok(MergePolicy::Overwrite),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}
