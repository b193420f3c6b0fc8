//! Text-field forms for materials and sections.
//!
//! A front end collects every field as text and hands the form to
//! `to_material` / `to_section`. Numbers accept a decimal comma; anything
//! non-numeric is an `InvalidNumber` error naming the field. Editing starts
//! from `from_material` / `from_section` so the form shows current values.

use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;
use crate::materials::{standard_class_codes, Material, MaterialType, CUSTOM_CLASS};
use crate::sections::{GeometryType, Section, SectionGeometry, DEFAULT_COVER_MM};
use crate::validation::parse_number;

/// Material dialog contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialForm {
    pub user_name: String,
    pub material_type: MaterialType,
    /// Standard class code, or [`CUSTOM_CLASS`]
    pub class_name: String,
    pub fck: String,
    pub fyk: String,
    pub es: String,
}

impl MaterialForm {
    /// Empty form for a new material, preset to the first standard class
    pub fn new(material_type: MaterialType) -> Self {
        let class_name = standard_class_codes(material_type)
            .first()
            .copied()
            .unwrap_or(CUSTOM_CLASS)
            .to_string();
        MaterialForm {
            user_name: String::new(),
            material_type,
            class_name,
            fck: String::new(),
            fyk: String::new(),
            es: String::new(),
        }
    }

    /// Form pre-filled from an existing material
    pub fn from_material(material: &Material) -> Self {
        let fmt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        MaterialForm {
            user_name: material.user_name.clone(),
            material_type: material.material_type(),
            class_name: material.class.name().to_string(),
            fck: fmt(material.fck()),
            fyk: fmt(material.fyk()),
            es: fmt(material.es()),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.class_name.trim() == CUSTOM_CLASS
    }

    /// Build the material. Property fields are only read for custom classes.
    ///
    /// # Errors
    ///
    /// `InvalidNumber` for unparsable custom properties, `UnknownClass` for
    /// an unknown standard class.
    pub fn to_material(&self) -> CoreResult<Material> {
        if !self.is_custom() {
            return Material::standard(
                self.user_name.clone(),
                self.material_type,
                &self.class_name,
            );
        }

        let material = match self.material_type {
            MaterialType::Concrete => {
                Material::custom_concrete(self.user_name.clone(), parse_number("fck", &self.fck)?)
            }
            MaterialType::RebarSteel => Material::custom_rebar(
                self.user_name.clone(),
                parse_number("fyk", &self.fyk)?,
                parse_number("Es", &self.es)?,
            ),
        };
        Ok(material)
    }
}

/// Section dialog contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionForm {
    pub user_name: String,
    pub geometry_type: GeometryType,
    pub b: String,
    pub h: String,
    pub d: String,
    pub material_name: String,
    pub cover_mm: String,
}

impl SectionForm {
    pub fn new(geometry_type: GeometryType) -> Self {
        SectionForm {
            user_name: String::new(),
            geometry_type,
            b: String::new(),
            h: String::new(),
            d: String::new(),
            material_name: String::new(),
            cover_mm: DEFAULT_COVER_MM.to_string(),
        }
    }

    pub fn from_section(section: &Section) -> Self {
        let mut form = SectionForm::new(section.geometry_type());
        form.user_name = section.user_name.clone();
        form.material_name = section.material_name.clone();
        form.cover_mm = section.cover_mm.to_string();
        match section.geometry {
            SectionGeometry::Rectangular { b, h } => {
                form.b = b.to_string();
                form.h = h.to_string();
            }
            SectionGeometry::Circular { d } => form.d = d.to_string(),
        }
        form
    }

    /// Build the section. A blank cover means the default 30 mm.
    ///
    /// Only parses; dimension limits and the material reference are checked
    /// when the section is saved into a profile.
    pub fn to_section(&self) -> CoreResult<Section> {
        let cover_mm = if self.cover_mm.trim().is_empty() {
            DEFAULT_COVER_MM
        } else {
            parse_number("cover_mm", &self.cover_mm)?
        };

        let section = match self.geometry_type {
            GeometryType::Rectangular => Section::rectangular(
                self.user_name.clone(),
                parse_number("b", &self.b)?,
                parse_number("h", &self.h)?,
                self.material_name.clone(),
                cover_mm,
            ),
            GeometryType::Circular => Section::circular(
                self.user_name.clone(),
                parse_number("D", &self.d)?,
                self.material_name.clone(),
                cover_mm,
            ),
        };
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreError;

    #[test]
    fn test_standard_material_ignores_property_fields() {
        let mut form = MaterialForm::new(MaterialType::Concrete);
        form.user_name = "C30 Beton".to_string();
        form.class_name = "C30/37".to_string();
        form.fck = "garbage".to_string();

        let material = form.to_material().unwrap();
        assert_eq!(material.fck(), Some(30.0));
        assert!(!material.is_custom());
    }

    #[test]
    fn test_custom_rebar_with_decimal_comma() {
        let mut form = MaterialForm::new(MaterialType::RebarSteel);
        form.user_name = "Özel".to_string();
        form.class_name = CUSTOM_CLASS.to_string();
        form.fyk = "432,5".to_string();
        form.es = "200000".to_string();

        let material = form.to_material().unwrap();
        assert_eq!(material.fyk(), Some(432.5));
        assert_eq!(material.es(), Some(200_000.0));
    }

    #[test]
    fn test_custom_concrete_bad_number() {
        let mut form = MaterialForm::new(MaterialType::Concrete);
        form.user_name = "X".to_string();
        form.class_name = CUSTOM_CLASS.to_string();
        form.fck = "yirmi beş".to_string();

        assert_eq!(
            form.to_material().unwrap_err(),
            CoreError::invalid_number("fck", "yirmi beş")
        );
    }

    #[test]
    fn test_unknown_class() {
        let mut form = MaterialForm::new(MaterialType::Concrete);
        form.user_name = "X".to_string();
        form.class_name = "C99/105".to_string();
        assert_eq!(form.to_material().unwrap_err().error_code(), "UNKNOWN_CLASS");
    }

    #[test]
    fn test_material_form_prefill() {
        let material = Material::custom_rebar("R", 450.0, 210_000.0);
        let form = MaterialForm::from_material(&material);
        assert!(form.is_custom());
        assert_eq!(form.fyk, "450");
        assert!(form.fck.is_empty());
        assert_eq!(form.to_material().unwrap(), material);
    }

    #[test]
    fn test_section_form_rectangular() {
        let mut form = SectionForm::new(GeometryType::Rectangular);
        form.user_name = "K1".to_string();
        form.b = "300".to_string();
        form.h = "500".to_string();
        form.material_name = "C25".to_string();

        let section = form.to_section().unwrap();
        assert_eq!(section.geometry, SectionGeometry::Rectangular { b: 300.0, h: 500.0 });
        assert_eq!(section.cover_mm, DEFAULT_COVER_MM);
    }

    #[test]
    fn test_section_form_errors() {
        let mut form = SectionForm::new(GeometryType::Circular);
        form.user_name = "S1".to_string();
        form.d = "abc".to_string();
        assert_eq!(
            form.to_section().unwrap_err(),
            CoreError::invalid_number("D", "abc")
        );

        form.d = "400".to_string();
        form.cover_mm = "x".to_string();
        assert_eq!(form.to_section().unwrap_err().error_code(), "INVALID_NUMBER");
    }

    #[test]
    fn test_section_form_prefill() {
        let section = Section::circular("S1", 400.0, "C25", 40.0);
        let form = SectionForm::from_section(&section);
        assert_eq!(form.d, "400");
        assert_eq!(form.cover_mm, "40");
        assert_eq!(form.to_section().unwrap(), section);
    }
}
