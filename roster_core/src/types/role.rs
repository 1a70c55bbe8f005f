use serde::{Deserialize, Serialize};
use std::fmt;

/// Planable role of an employee or shift definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Nursing,
    Doctor,
}

impl Role {
    /// Deterministic mapping from an employee's free-form `function`.
    ///
    /// Nursing functions and the nursing team lead map to `Nursing`,
    /// physicians and contract physicians to `Doctor`. Everything else
    /// (physiotherapy, administration, unknown, empty) returns `None` and is
    /// excluded from planning. Never an error.
    pub fn from_function(function: &str) -> Option<Role> {
        match function.trim().to_lowercase().as_str() {
            "pflegefachkraft" | "pflegekraft" | "krankenpfleger" | "krankenschwester"
            | "pflegedienstleitung" => Some(Role::Nursing),
            "arzt" | "ärztin" | "honorararzt" | "honorarärztin" => Some(Role::Doctor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Nursing => "NURSING",
            Role::Doctor => "DOCTOR",
        }
    }

    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "NURSING" => Some(Role::Nursing),
            "DOCTOR" => Some(Role::Doctor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nursing_functions() {
        assert_eq!(Role::from_function("Pflegefachkraft"), Some(Role::Nursing));
        assert_eq!(Role::from_function("  pflegekraft "), Some(Role::Nursing));
        assert_eq!(Role::from_function("Pflegedienstleitung"), Some(Role::Nursing));
    }

    #[test]
    fn doctor_functions() {
        assert_eq!(Role::from_function("Arzt"), Some(Role::Doctor));
        assert_eq!(Role::from_function("Ärztin"), Some(Role::Doctor));
        assert_eq!(Role::from_function("Honorararzt"), Some(Role::Doctor));
    }

    #[test]
    fn everything_else_is_unplanable() {
        assert_eq!(Role::from_function("Physiotherapie"), None);
        assert_eq!(Role::from_function("Verwaltung"), None);
        assert_eq!(Role::from_function(""), None);
    }
}
