use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic partition of the organisation.
///
/// Employees are tagged Nord or Süd; only some weekend on-site shifts are
/// tagged Mitte, and those accept any planable nursing employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    #[serde(rename = "Nord")]
    Nord,
    #[serde(rename = "Süd")]
    Sued,
    #[serde(rename = "Mitte")]
    Mitte,
}

impl Area {
    /// Collapses a free-form area string into the closed canonical set.
    ///
    /// Recognised aliases (case-insensitive): `nord`, `nordkreis` → Nord;
    /// `süd`, `sued`, `südkreis`, `suedkreis` → Süd; `mitte` → Mitte.
    /// Anything else is unknown.
    pub fn normalise(raw: &str) -> Option<Area> {
        match raw.trim().to_lowercase().as_str() {
            "nord" | "nordkreis" => Some(Area::Nord),
            "süd" | "sued" | "südkreis" | "suedkreis" => Some(Area::Sued),
            "mitte" => Some(Area::Mitte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Nord => "Nord",
            Area::Sued => "Süd",
            Area::Mitte => "Mitte",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
