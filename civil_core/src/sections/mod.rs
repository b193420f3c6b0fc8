//! # Sections
//!
//! Named cross-sections defined inside a profile. Each section has a
//! geometry, a concrete cover and a reference (by name) to a concrete
//! material of the same profile.
//!
//! ## JSON Serialization
//!
//! ```json
//! { "user_name": "K 30x50", "geometry_type": "Rectangular",
//!   "dimensions": { "b": 300.0, "h": 500.0 },
//!   "material_name": "Beton C25", "cover_mm": 30.0 }
//!
//! { "user_name": "S-40", "geometry_type": "Circular",
//!   "dimensions": { "D": 400.0 },
//!   "material_name": "Beton C30", "cover_mm": 40.0 }
//! ```

pub mod registry;

pub use registry::SectionRegistry;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::equations::section::{
    circular_area, circular_moment_of_inertia, rectangular_area, rectangular_moment_of_inertia,
};
use crate::errors::{CoreError, CoreResult, EntityKind};
use crate::materials::MaterialRegistry;
use crate::validation::normalize_name;

/// Cover used when a stored section omits one (mm)
pub const DEFAULT_COVER_MM: f64 = 30.0;

/// Geometry discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    #[serde(alias = "Dikdörtgen")]
    Rectangular,
    #[serde(alias = "Dairesel")]
    Circular,
}

impl GeometryType {
    pub const ALL: [GeometryType; 2] = [GeometryType::Rectangular, GeometryType::Circular];

    pub fn display_name(&self) -> &'static str {
        match self {
            GeometryType::Rectangular => "Rectangular",
            GeometryType::Circular => "Circular",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "rectangular" | "rect" | "r" | "dikdörtgen" => Ok(GeometryType::Rectangular),
            "circular" | "circle" | "c" | "dairesel" => Ok(GeometryType::Circular),
            _ => Err(CoreError::invalid_input(
                "geometry_type",
                s,
                "Expected 'rectangular' or 'circular'",
            )),
        }
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Cross-section shape with its dimensions in mm
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionGeometry {
    Rectangular { b: f64, h: f64 },
    Circular { d: f64 },
}

impl SectionGeometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            SectionGeometry::Rectangular { .. } => GeometryType::Rectangular,
            SectionGeometry::Circular { .. } => GeometryType::Circular,
        }
    }

    /// Every dimension must be a positive finite number.
    pub fn validate(&self) -> CoreResult<()> {
        let dims = match *self {
            SectionGeometry::Rectangular { b, h } => vec![("b", b), ("h", h)],
            SectionGeometry::Circular { d } => vec![("D", d)],
        };
        for (field, value) in dims {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::invalid_dimensions(
                    field,
                    value.to_string(),
                    "Dimension must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Gross geometric properties
    pub fn properties(&self) -> SectionProperties {
        match *self {
            SectionGeometry::Rectangular { b, h } => SectionProperties {
                area_mm2: rectangular_area(b, h),
                ix_mm4: rectangular_moment_of_inertia(b, h),
                iy_mm4: rectangular_moment_of_inertia(h, b),
            },
            SectionGeometry::Circular { d } => {
                let i = circular_moment_of_inertia(d);
                SectionProperties {
                    area_mm2: circular_area(d),
                    ix_mm4: i,
                    iy_mm4: i,
                }
            }
        }
    }

    /// Dimension summary for list views, e.g. "300x500" or "Ø400"
    pub fn dimension_label(&self) -> String {
        match self {
            SectionGeometry::Rectangular { b, h } => format!("{}x{}", b, h),
            SectionGeometry::Circular { d } => format!("Ø{}", d),
        }
    }
}

/// Gross section properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Area (mm²)
    pub area_mm2: f64,
    /// Moment of inertia about the horizontal axis (mm⁴)
    pub ix_mm4: f64,
    /// Moment of inertia about the vertical axis (mm⁴)
    pub iy_mm4: f64,
}

/// A named cross-section inside a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SectionRecord", into = "SectionRecord")]
pub struct Section {
    pub user_name: String,
    pub geometry: SectionGeometry,
    /// Name of a concrete material in the same profile
    pub material_name: String,
    /// Clear cover to the reinforcement (mm)
    pub cover_mm: f64,
}

impl Section {
    pub fn rectangular(
        user_name: impl Into<String>,
        b: f64,
        h: f64,
        material_name: impl Into<String>,
        cover_mm: f64,
    ) -> Self {
        Section {
            user_name: user_name.into(),
            geometry: SectionGeometry::Rectangular { b, h },
            material_name: material_name.into(),
            cover_mm,
        }
    }

    pub fn circular(
        user_name: impl Into<String>,
        d: f64,
        material_name: impl Into<String>,
        cover_mm: f64,
    ) -> Self {
        Section {
            user_name: user_name.into(),
            geometry: SectionGeometry::Circular { d },
            material_name: material_name.into(),
            cover_mm,
        }
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry.geometry_type()
    }

    pub fn properties(&self) -> SectionProperties {
        self.geometry.properties()
    }

    /// Label for list views, e.g. "Rectangular: K 30x50 (300x500)"
    pub fn display_name(&self) -> String {
        format!(
            "{}: {} ({})",
            self.geometry_type(),
            self.user_name,
            self.geometry.dimension_label()
        )
    }

    /// Check the section before it enters a registry.
    ///
    /// Runs in order: name, dimensions, cover, material reference.
    pub fn validated(mut self, materials: &MaterialRegistry) -> CoreResult<Self> {
        self.user_name = normalize_name(EntityKind::Section, &self.user_name)?;
        self.geometry.validate()?;
        if !(self.cover_mm.is_finite() && self.cover_mm >= 0.0) {
            return Err(CoreError::invalid_dimensions(
                "cover_mm",
                self.cover_mm.to_string(),
                "Cover cannot be negative",
            ));
        }
        self.material_name = self.material_name.trim().to_string();
        if materials.resolve_concrete(&self.material_name).is_none() {
            return Err(CoreError::unresolved_material(
                &self.user_name,
                &self.material_name,
            ));
        }
        Ok(self)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn default_cover() -> f64 {
    DEFAULT_COVER_MM
}

/// On-disk layout of a section
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SectionRecord {
    user_name: String,
    #[serde(alias = "type")]
    geometry_type: GeometryType,
    dimensions: BTreeMap<String, f64>,
    #[serde(default)]
    material_name: String,
    #[serde(alias = "cover", default = "default_cover")]
    cover_mm: f64,
}

fn required_dimension(dims: &BTreeMap<String, f64>, key: &str, user_name: &str) -> CoreResult<f64> {
    dims.get(key).copied().ok_or_else(|| {
        CoreError::invalid_dimensions(
            format!("{}.dimensions.{}", user_name, key),
            "missing",
            "Required dimension is absent",
        )
    })
}

impl TryFrom<SectionRecord> for Section {
    type Error = CoreError;

    fn try_from(record: SectionRecord) -> Result<Self, Self::Error> {
        let geometry = match record.geometry_type {
            GeometryType::Rectangular => SectionGeometry::Rectangular {
                b: required_dimension(&record.dimensions, "b", &record.user_name)?,
                h: required_dimension(&record.dimensions, "h", &record.user_name)?,
            },
            GeometryType::Circular => SectionGeometry::Circular {
                d: required_dimension(&record.dimensions, "D", &record.user_name)?,
            },
        };
        Ok(Section {
            user_name: record.user_name,
            geometry,
            material_name: record.material_name,
            cover_mm: record.cover_mm,
        })
    }
}

impl From<Section> for SectionRecord {
    fn from(section: Section) -> Self {
        let mut dimensions = BTreeMap::new();
        match section.geometry {
            SectionGeometry::Rectangular { b, h } => {
                dimensions.insert("b".to_string(), b);
                dimensions.insert("h".to_string(), h);
            }
            SectionGeometry::Circular { d } => {
                dimensions.insert("D".to_string(), d);
            }
        }
        SectionRecord {
            user_name: section.user_name,
            geometry_type: section.geometry.geometry_type(),
            dimensions,
            material_name: section.material_name,
            cover_mm: section.cover_mm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Material, MaterialType};
    use approx::assert_relative_eq;

    fn materials() -> MaterialRegistry {
        let mut reg = MaterialRegistry::new();
        reg.save(
            Material::standard("Beton C25", MaterialType::Concrete, "C25/30").unwrap(),
            None,
        )
        .unwrap();
        reg.save(
            Material::standard("S420", MaterialType::RebarSteel, "B420C").unwrap(),
            None,
        )
        .unwrap();
        reg
    }

    #[test]
    fn test_rectangular_properties() {
        let s = Section::rectangular("K", 300.0, 500.0, "Beton C25", 30.0);
        let p = s.properties();
        assert_relative_eq!(p.area_mm2, 150_000.0);
        assert_relative_eq!(p.ix_mm4, 3.125e9);
        assert_relative_eq!(p.iy_mm4, 1.125e9);
    }

    #[test]
    fn test_circular_properties() {
        let s = Section::circular("S", 400.0, "Beton C25", 40.0);
        let p = s.properties();
        assert_relative_eq!(p.area_mm2, 125_663.706, max_relative = 1e-6);
        assert_eq!(p.ix_mm4, p.iy_mm4);
    }

    #[test]
    fn test_validated_ok() {
        let s = Section::rectangular(" K 30x50 ", 300.0, 500.0, "Beton C25", 0.0)
            .validated(&materials())
            .unwrap();
        assert_eq!(s.user_name, "K 30x50");
    }

    #[test]
    fn test_validated_dimensions() {
        let mats = materials();
        let err = Section::rectangular("K", 0.0, 500.0, "Beton C25", 30.0)
            .validated(&mats)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { ref field, .. } if field == "b"));

        let err = Section::circular("S", -400.0, "Beton C25", 30.0)
            .validated(&mats)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DIMENSIONS");

        let err = Section::rectangular("K", 300.0, 500.0, "Beton C25", -1.0)
            .validated(&mats)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { ref field, .. } if field == "cover_mm"));
    }

    #[test]
    fn test_validated_material_must_be_concrete() {
        let mats = materials();
        let err = Section::rectangular("K", 300.0, 500.0, "S420", 30.0)
            .validated(&mats)
            .unwrap_err();
        assert_eq!(err, CoreError::unresolved_material("K", "S420"));

        let err = Section::rectangular("K", 300.0, 500.0, "Yok", 30.0)
            .validated(&mats)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNRESOLVED_MATERIAL");
    }

    #[test]
    fn test_section_serialization_layout() {
        let s = Section::rectangular("K 30x50", 300.0, 500.0, "Beton C25", 30.0);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["geometry_type"], "Rectangular");
        assert_eq!(json["dimensions"]["b"], 300.0);
        assert_eq!(json["dimensions"]["h"], 500.0);
        assert_eq!(json["cover_mm"], 30.0);

        let c = Section::circular("S", 400.0, "Beton C25", 40.0);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["dimensions"]["D"], 400.0);
        let back: Section = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_section_record_with_type_key() {
        let json = r#"{
            "user_name": "Kiriş",
            "type": "Dikdörtgen",
            "material_name": "Beton C25",
            "dimensions": {"b": 250.0, "h": 600.0}
        }"#;
        let s: Section = serde_json::from_str(json).unwrap();
        assert_eq!(s.geometry, SectionGeometry::Rectangular { b: 250.0, h: 600.0 });
        assert_eq!(s.cover_mm, DEFAULT_COVER_MM);
        assert_eq!(s.material_name, "Beton C25");

        let json = r#"{"user_name": "Kolon", "type": "Dairesel", "dimensions": {"D": 500.0}, "cover": 25.0}"#;
        let s: Section = serde_json::from_str(json).unwrap();
        assert_eq!(s.geometry, SectionGeometry::Circular { d: 500.0 });
        assert_eq!(s.cover_mm, 25.0);
        assert_eq!(s.material_name, "");
    }

    #[test]
    fn test_missing_dimension_fails() {
        let json = r#"{"user_name": "S", "geometry_type": "Circular", "dimensions": {"b": 1.0}}"#;
        assert!(serde_json::from_str::<Section>(json).is_err());
    }

    #[test]
    fn test_display_name() {
        let s = Section::circular("S-40", 400.0, "Beton C25", 40.0);
        assert_eq!(s.display_name(), "Circular: S-40 (Ø400)");
    }
}
