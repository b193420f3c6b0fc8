//! Standard Material Classes (TS 500 / TS 708)
//!
//! Characteristic strengths for the concrete classes and reinforcing steel
//! grades a profile can pick without entering custom properties.
//!
//! | Class  | fck (MPa) |   | Grade | fyk (MPa) | Es (MPa) |
//! |--------|-----------|---|-------|-----------|----------|
//! | C20/25 | 20        |   | B420C | 420       | 200000   |
//! | C25/30 | 25        |   | B500C | 500       | 200000   |
//! | C30/37 | 30        |   |       |           |          |
//! | C35/45 | 35        |   |       |           |          |
//! | C40/50 | 40        |   |       |           |          |
//! | C45/55 | 45        |   |       |           |          |
//! | C50/60 | 50        |   |       |           |          |

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::materials::{MaterialProps, MaterialType};

/// Elastic modulus shared by all standard reinforcing grades (MPa)
pub const REBAR_ES_MPA: f64 = 200_000.0;

/// Standard concrete strength classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcreteClass {
    #[serde(rename = "C20/25")]
    C20,
    #[serde(rename = "C25/30")]
    C25,
    #[serde(rename = "C30/37")]
    C30,
    #[serde(rename = "C35/45")]
    C35,
    #[serde(rename = "C40/50")]
    C40,
    #[serde(rename = "C45/55")]
    C45,
    #[serde(rename = "C50/60")]
    C50,
}

impl ConcreteClass {
    /// All concrete classes for UI selection
    pub const ALL: [ConcreteClass; 7] = [
        ConcreteClass::C20,
        ConcreteClass::C25,
        ConcreteClass::C30,
        ConcreteClass::C35,
        ConcreteClass::C40,
        ConcreteClass::C45,
        ConcreteClass::C50,
    ];

    /// Class designation as stored in profiles (e.g., "C25/30")
    pub fn code(&self) -> &'static str {
        match self {
            ConcreteClass::C20 => "C20/25",
            ConcreteClass::C25 => "C25/30",
            ConcreteClass::C30 => "C30/37",
            ConcreteClass::C35 => "C35/45",
            ConcreteClass::C40 => "C40/50",
            ConcreteClass::C45 => "C45/55",
            ConcreteClass::C50 => "C50/60",
        }
    }

    /// Characteristic cylinder compressive strength fck (MPa)
    pub fn fck_mpa(&self) -> f64 {
        match self {
            ConcreteClass::C20 => 20.0,
            ConcreteClass::C25 => 25.0,
            ConcreteClass::C30 => 30.0,
            ConcreteClass::C35 => 35.0,
            ConcreteClass::C40 => 40.0,
            ConcreteClass::C45 => 45.0,
            ConcreteClass::C50 => 50.0,
        }
    }

    /// Parse from the exact class designation
    pub fn from_code(s: &str) -> CoreResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == s.trim())
            .ok_or_else(|| CoreError::unknown_class(MaterialType::Concrete.display_name(), s))
    }
}

impl std::fmt::Display for ConcreteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Standard reinforcing steel grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RebarGrade {
    B420C,
    B500C,
}

impl RebarGrade {
    /// All rebar grades for UI selection
    pub const ALL: [RebarGrade; 2] = [RebarGrade::B420C, RebarGrade::B500C];

    pub fn code(&self) -> &'static str {
        match self {
            RebarGrade::B420C => "B420C",
            RebarGrade::B500C => "B500C",
        }
    }

    /// Characteristic yield strength fyk (MPa)
    pub fn fyk_mpa(&self) -> f64 {
        match self {
            RebarGrade::B420C => 420.0,
            RebarGrade::B500C => 500.0,
        }
    }

    /// Modulus of elasticity Es (MPa)
    pub fn es_mpa(&self) -> f64 {
        REBAR_ES_MPA
    }

    pub fn from_code(s: &str) -> CoreResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.code() == s.trim())
            .ok_or_else(|| CoreError::unknown_class(MaterialType::RebarSteel.display_name(), s))
    }
}

impl std::fmt::Display for RebarGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Look up the properties of a standard class.
///
/// Pure table lookup; custom materials never go through here.
///
/// # Example
///
/// ```rust
/// use civil_core::materials::{resolve_standard_props, MaterialProps, MaterialType};
///
/// let props = resolve_standard_props(MaterialType::Concrete, "C25/30").unwrap();
/// assert_eq!(props, MaterialProps::Concrete { fck: 25.0 });
/// ```
pub fn resolve_standard_props(material_type: MaterialType, class_name: &str) -> CoreResult<MaterialProps> {
    match material_type {
        MaterialType::Concrete => {
            let class = ConcreteClass::from_code(class_name)?;
            Ok(MaterialProps::Concrete {
                fck: class.fck_mpa(),
            })
        }
        MaterialType::RebarSteel => {
            let grade = RebarGrade::from_code(class_name)?;
            Ok(MaterialProps::RebarSteel {
                fyk: grade.fyk_mpa(),
                es: grade.es_mpa(),
            })
        }
    }
}

/// Class designations available for a material type, in table order
pub fn standard_class_codes(material_type: MaterialType) -> Vec<&'static str> {
    match material_type {
        MaterialType::Concrete => ConcreteClass::ALL.iter().map(|c| c.code()).collect(),
        MaterialType::RebarSteel => RebarGrade::ALL.iter().map(|g| g.code()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_lookup() {
        let props = resolve_standard_props(MaterialType::Concrete, "C25/30").unwrap();
        assert_eq!(props, MaterialProps::Concrete { fck: 25.0 });

        let props = resolve_standard_props(MaterialType::Concrete, "C50/60").unwrap();
        assert_eq!(props, MaterialProps::Concrete { fck: 50.0 });
    }

    #[test]
    fn test_rebar_lookup() {
        let props = resolve_standard_props(MaterialType::RebarSteel, "B420C").unwrap();
        assert_eq!(
            props,
            MaterialProps::RebarSteel {
                fyk: 420.0,
                es: 200_000.0
            }
        );
    }

    #[test]
    fn test_unknown_class() {
        let err = resolve_standard_props(MaterialType::Concrete, "C99/105").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_CLASS");

        // Class names are per type
        let err = resolve_standard_props(MaterialType::RebarSteel, "C25/30").unwrap_err();
        assert!(matches!(err, CoreError::UnknownClass { .. }));
    }

    #[test]
    fn test_class_codes_listing() {
        let codes = standard_class_codes(MaterialType::Concrete);
        assert_eq!(codes.len(), 7);
        assert_eq!(codes[0], "C20/25");
        assert_eq!(standard_class_codes(MaterialType::RebarSteel), vec!["B420C", "B500C"]);
    }

    #[test]
    fn test_concrete_class_serialization() {
        let json = serde_json::to_string(&ConcreteClass::C30).unwrap();
        assert_eq!(json, "\"C30/37\"");
    }
}
