//! Domain model for duty-roster planning.
//!
//! All entities are identified by opaque `i64` ids; relationships are by id.
//! Free-form strings (employee function, area names) are canonicalised here
//! before anything downstream looks at them.

pub mod area;
pub mod assignment;
pub mod capacity;
pub mod employee;
pub mod role;
pub mod shift;

pub use area::Area;
pub use assignment::{Assignment, AssignmentSource, MergePolicy, ParsePolicyError};
pub use capacity::{CapacityType, EmployeeCapacity};
pub use employee::Employee;
pub use role::Role;
pub use shift::{ShiftCategory, ShiftDefinition, ShiftInstance, TimeOfDay};

/// Opaque id of an employee row.
pub type EmployeeId = i64;
/// Opaque id of a shift-definition row.
pub type ShiftDefinitionId = i64;
/// Opaque id of a shift-instance row.
pub type ShiftInstanceId = i64;
/// Opaque id of an assignment row.
pub type AssignmentId = i64;
