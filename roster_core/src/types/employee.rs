use serde::{Deserialize, Serialize};

use crate::types::{Area, EmployeeId};

/// An employee record as loaded from the store.
///
/// `function` stays free-form; the planable role is derived from it during
/// context assembly. `area` is already canonical or unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub given_name: String,
    pub family_name: String,
    pub function: String,
    pub area: Option<Area>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}
