//! # Materials
//!
//! Named materials defined inside a profile. A material is either concrete
//! (needs `fck`) or reinforcing steel (needs `fyk` and `Es`), and either
//! follows a standard class from [`standard`] or carries custom properties.
//!
//! ## JSON Serialization
//!
//! Materials keep the flat record layout of `profiles.json`:
//!
//! ```json
//! { "user_name": "Beton C25", "type": "Concrete", "class_name": "C25/30",
//!   "is_custom": false, "props": { "fck": 25.0 } }
//!
//! { "user_name": "S420 özel", "type": "RebarSteel", "class_name": "Custom",
//!   "is_custom": true, "props": { "fyk": 430.0, "Es": 200000.0 } }
//! ```
//!
//! In memory the properties are a tagged variant, so a concrete material
//! cannot exist without `fck`.
//!
//! ## Example
//!
//! ```rust
//! use civil_core::materials::{Material, MaterialType};
//!
//! let concrete = Material::standard("Beton C25", MaterialType::Concrete, "C25/30").unwrap();
//! assert_eq!(concrete.fck(), Some(25.0));
//!
//! let rebar = Material::custom_rebar("Özel donatı", 430.0, 200_000.0);
//! assert_eq!(rebar.fyk(), Some(430.0));
//! ```

pub mod registry;
pub mod standard;

pub use registry::MaterialRegistry;
pub use standard::{resolve_standard_props, standard_class_codes, ConcreteClass, RebarGrade};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult, EntityKind};
use crate::validation::{normalize_name, require_positive};

/// Class tag stored for materials with user-supplied properties
pub const CUSTOM_CLASS: &str = "Custom";

/// Material category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    #[serde(alias = "Beton")]
    Concrete,
    #[serde(alias = "Donatı Çeliği")]
    RebarSteel,
}

impl MaterialType {
    pub const ALL: [MaterialType; 2] = [MaterialType::Concrete, MaterialType::RebarSteel];

    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::Concrete => "Concrete",
            MaterialType::RebarSteel => "Rebar Steel",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "concrete" | "beton" | "c" => Ok(MaterialType::Concrete),
            "rebarsteel" | "rebar" | "steel" | "donatı" | "donatıçeliği" | "r" => {
                Ok(MaterialType::RebarSteel)
            }
            _ => Err(CoreError::invalid_input(
                "type",
                s,
                "Expected 'concrete' or 'rebar'",
            )),
        }
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Where a material's properties come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialClass {
    /// Standard class designation, e.g. "C25/30" or "B420C"
    Standard(String),
    /// User-supplied properties
    Custom,
}

impl MaterialClass {
    pub fn is_custom(&self) -> bool {
        matches!(self, MaterialClass::Custom)
    }

    /// Class name as stored on disk
    pub fn name(&self) -> &str {
        match self {
            MaterialClass::Standard(code) => code,
            MaterialClass::Custom => CUSTOM_CLASS,
        }
    }
}

/// Mechanical properties, in MPa
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialProps {
    Concrete {
        /// Characteristic compressive strength
        fck: f64,
    },
    RebarSteel {
        /// Characteristic yield strength
        fyk: f64,
        /// Modulus of elasticity
        es: f64,
    },
}

impl MaterialProps {
    pub fn material_type(&self) -> MaterialType {
        match self {
            MaterialProps::Concrete { .. } => MaterialType::Concrete,
            MaterialProps::RebarSteel { .. } => MaterialType::RebarSteel,
        }
    }

    /// Every property must be a positive finite number.
    pub fn validate(&self) -> CoreResult<()> {
        match *self {
            MaterialProps::Concrete { fck } => {
                require_positive("fck", fck)?;
            }
            MaterialProps::RebarSteel { fyk, es } => {
                require_positive("fyk", fyk)?;
                require_positive("Es", es)?;
            }
        }
        Ok(())
    }
}

/// A named material inside a profile.
///
/// Identity is `user_name`, unique within the owning profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaterialRecord", into = "MaterialRecord")]
pub struct Material {
    pub user_name: String,
    pub class: MaterialClass,
    pub props: MaterialProps,
}

impl Material {
    /// Create a material from a standard class, looking up its properties.
    pub fn standard(
        user_name: impl Into<String>,
        material_type: MaterialType,
        class_name: &str,
    ) -> CoreResult<Self> {
        let props = resolve_standard_props(material_type, class_name)?;
        Ok(Material {
            user_name: user_name.into(),
            class: MaterialClass::Standard(class_name.trim().to_string()),
            props,
        })
    }

    /// Create a concrete material with a user-supplied fck (MPa).
    pub fn custom_concrete(user_name: impl Into<String>, fck: f64) -> Self {
        Material {
            user_name: user_name.into(),
            class: MaterialClass::Custom,
            props: MaterialProps::Concrete { fck },
        }
    }

    /// Create a reinforcing steel with user-supplied fyk and Es (MPa).
    pub fn custom_rebar(user_name: impl Into<String>, fyk: f64, es: f64) -> Self {
        Material {
            user_name: user_name.into(),
            class: MaterialClass::Custom,
            props: MaterialProps::RebarSteel { fyk, es },
        }
    }

    pub fn material_type(&self) -> MaterialType {
        self.props.material_type()
    }

    pub fn is_concrete(&self) -> bool {
        self.material_type() == MaterialType::Concrete
    }

    pub fn is_custom(&self) -> bool {
        self.class.is_custom()
    }

    /// Concrete fck (MPa), `None` for steel
    pub fn fck(&self) -> Option<f64> {
        match self.props {
            MaterialProps::Concrete { fck } => Some(fck),
            MaterialProps::RebarSteel { .. } => None,
        }
    }

    /// Steel fyk (MPa), `None` for concrete
    pub fn fyk(&self) -> Option<f64> {
        match self.props {
            MaterialProps::RebarSteel { fyk, .. } => Some(fyk),
            MaterialProps::Concrete { .. } => None,
        }
    }

    /// Steel Es (MPa), `None` for concrete
    pub fn es(&self) -> Option<f64> {
        match self.props {
            MaterialProps::RebarSteel { es, .. } => Some(es),
            MaterialProps::Concrete { .. } => None,
        }
    }

    /// Short label for list views, e.g. "Beton C25 (Concrete, C25/30)"
    pub fn display_name(&self) -> String {
        format!(
            "{} ({}, {})",
            self.user_name,
            self.material_type(),
            self.class.name()
        )
    }

    /// Check the material before it enters a registry.
    ///
    /// Trims the name, rejects empty names, and checks every property is a
    /// positive finite number. Standard materials get their properties
    /// re-derived from the class table, so a stale or hand-edited value
    /// cannot survive a save.
    pub fn validated(mut self) -> CoreResult<Self> {
        self.user_name = normalize_name(EntityKind::Material, &self.user_name)?;
        if let MaterialClass::Standard(code) = &self.class {
            self.props = resolve_standard_props(self.material_type(), code)?;
        }
        self.props.validate()?;
        Ok(self)
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// On-disk layout of a material
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MaterialRecord {
    user_name: String,
    #[serde(rename = "type")]
    material_type: MaterialType,
    #[serde(alias = "class")]
    class_name: String,
    #[serde(default)]
    is_custom: bool,
    #[serde(default)]
    props: BTreeMap<String, f64>,
}

fn required_prop(props: &BTreeMap<String, f64>, key: &str, user_name: &str) -> CoreResult<f64> {
    props.get(key).copied().ok_or_else(|| {
        CoreError::invalid_input(
            format!("{}.props.{}", user_name, key),
            "missing",
            "Required material property is absent",
        )
    })
}

impl TryFrom<MaterialRecord> for Material {
    type Error = CoreError;

    fn try_from(record: MaterialRecord) -> Result<Self, Self::Error> {
        let props = match record.material_type {
            MaterialType::Concrete => MaterialProps::Concrete {
                fck: required_prop(&record.props, "fck", &record.user_name)?,
            },
            MaterialType::RebarSteel => MaterialProps::RebarSteel {
                fyk: required_prop(&record.props, "fyk", &record.user_name)?,
                es: required_prop(&record.props, "Es", &record.user_name)?,
            },
        };
        let class = if record.is_custom {
            MaterialClass::Custom
        } else {
            MaterialClass::Standard(record.class_name)
        };
        Ok(Material {
            user_name: record.user_name,
            class,
            props,
        })
    }
}

impl From<Material> for MaterialRecord {
    fn from(material: Material) -> Self {
        let mut props = BTreeMap::new();
        match material.props {
            MaterialProps::Concrete { fck } => {
                props.insert("fck".to_string(), fck);
            }
            MaterialProps::RebarSteel { fyk, es } => {
                props.insert("fyk".to_string(), fyk);
                props.insert("Es".to_string(), es);
            }
        }
        MaterialRecord {
            user_name: material.user_name,
            material_type: material.props.material_type(),
            class_name: material.class.name().to_string(),
            is_custom: material.class.is_custom(),
            props,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_material() {
        let mat = Material::standard("B1", MaterialType::Concrete, "C30/37").unwrap();
        assert_eq!(mat.fck(), Some(30.0));
        assert_eq!(mat.fyk(), None);
        assert!(!mat.is_custom());
        assert!(mat.is_concrete());
    }

    #[test]
    fn test_standard_material_unknown_class() {
        let err = Material::standard("B1", MaterialType::Concrete, "C12/15").unwrap_err();
        assert!(matches!(err, CoreError::UnknownClass { .. }));
    }

    #[test]
    fn test_validated_trims_name_and_rederives_props() {
        let mut mat = Material::standard("  Beton  ", MaterialType::Concrete, "C25/30").unwrap();
        mat.props = MaterialProps::Concrete { fck: 999.0 };
        let mat = mat.validated().unwrap();
        assert_eq!(mat.user_name, "Beton");
        assert_eq!(mat.fck(), Some(25.0));
    }

    #[test]
    fn test_validated_rejects_bad_numbers() {
        let err = Material::custom_concrete("X", 0.0).validated().unwrap_err();
        assert_eq!(err, CoreError::invalid_number("fck", "0"));

        let err = Material::custom_rebar("Y", 420.0, -5.0)
            .validated()
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_NUMBER");

        let err = Material::custom_concrete(" ", 25.0).validated().unwrap_err();
        assert_eq!(err, CoreError::empty_name(EntityKind::Material));
    }

    #[test]
    fn test_material_serialization_layout() {
        let mat = Material::standard("Beton C25", MaterialType::Concrete, "C25/30").unwrap();
        let json = serde_json::to_value(&mat).unwrap();
        assert_eq!(json["user_name"], "Beton C25");
        assert_eq!(json["type"], "Concrete");
        assert_eq!(json["class_name"], "C25/30");
        assert_eq!(json["is_custom"], false);
        assert_eq!(json["props"]["fck"], 25.0);

        let rebar = Material::custom_rebar("Özel", 430.0, 200_000.0);
        let json = serde_json::to_value(&rebar).unwrap();
        assert_eq!(json["class_name"], CUSTOM_CLASS);
        assert_eq!(json["is_custom"], true);
        assert_eq!(json["props"]["Es"], 200_000.0);
    }

    #[test]
    fn test_material_roundtrip() {
        let mat = Material::custom_rebar("Donatı Ø", 430.0, 205_000.0);
        let json = serde_json::to_string(&mat).unwrap();
        let parsed: Material = serde_json::from_str(&json).unwrap();
        assert_eq!(mat, parsed);
    }

    #[test]
    fn test_legacy_record_is_accepted() {
        let json = r#"{
            "user_name": "Beton",
            "type": "Beton",
            "class": "C25/30",
            "is_custom": false,
            "props": { "fck": 25.0 }
        }"#;
        let mat: Material = serde_json::from_str(json).unwrap();
        assert_eq!(mat.material_type(), MaterialType::Concrete);
        assert_eq!(mat.class, MaterialClass::Standard("C25/30".to_string()));
    }

    #[test]
    fn test_missing_required_prop_fails() {
        let json = r#"{
            "user_name": "Çelik",
            "type": "RebarSteel",
            "class_name": "B420C",
            "props": { "fyk": 420.0 }
        }"#;
        assert!(serde_json::from_str::<Material>(json).is_err());
    }

    #[test]
    fn test_material_type_parsing() {
        assert_eq!(
            MaterialType::from_str_flexible("Concrete").unwrap(),
            MaterialType::Concrete
        );
        assert_eq!(
            MaterialType::from_str_flexible("rebar").unwrap(),
            MaterialType::RebarSteel
        );
        assert_eq!(
            MaterialType::from_str_flexible("Donatı Çeliği").unwrap(),
            MaterialType::RebarSteel
        );
        assert!(MaterialType::from_str_flexible("timber").is_err());
    }
}
