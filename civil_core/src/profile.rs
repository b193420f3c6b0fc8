//! # Profile Data Structures
//!
//! A `Profile` is the unit of save/load: project metadata plus the
//! materials and sections defined for that project. Profiles are stored in
//! `profiles.json` as a map from profile name to profile body.
//!
//! ## Structure
//!
//! ```text
//! profiles.json
//! └── "<profile name>": Profile
//!     ├── project_info: ProjectInfo (name mirror, engineer, codes, units)
//!     ├── materials: [Material]
//!     └── sections: [Section]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use civil_core::profile::Profile;
//! use civil_core::materials::{Material, MaterialType};
//! use civil_core::sections::Section;
//!
//! let mut profile = Profile::new("Konut Projesi");
//! profile
//!     .save_material(Material::standard("C25", MaterialType::Concrete, "C25/30").unwrap(), None)
//!     .unwrap();
//! profile
//!     .save_section(Section::rectangular("K1", 300.0, 500.0, "C25", 30.0), None)
//!     .unwrap();
//!
//! let json = serde_json::to_string_pretty(&profile).unwrap();
//! assert!(json.contains("Konut Projesi"));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::materials::{Material, MaterialRegistry};
use crate::sections::{Section, SectionRegistry};

/// Default design codes and unit system for new profiles
pub const DEFAULT_CONCRETE_CODE: &str = "TS 500 (2000)";
pub const DEFAULT_SEISMIC_CODE: &str = "TBDY 2018";
pub const DEFAULT_LOAD_CODE: &str = "TS 498 (1997)";
pub const DEFAULT_UNITS: &str = "Metric (kN, m, C)";

/// Descriptive project metadata.
///
/// Field names on disk follow the existing `profiles.json` layout
/// (`desc`, `concrete_reg`, ...). Missing fields load as defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    /// Mirror of the owning profile's name
    pub name: String,

    #[serde(rename = "desc")]
    pub description: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Concrete design code (e.g., "TS 500 (2000)")
    #[serde(rename = "concrete_reg")]
    pub concrete_code: String,

    /// Seismic code (e.g., "TBDY 2018")
    #[serde(rename = "seismic_reg")]
    pub seismic_code: String,

    /// Load code (e.g., "TS 498 (1997)")
    #[serde(rename = "load_reg")]
    pub load_code: String,

    /// Unit system label
    pub units: String,
}

impl ProjectInfo {
    pub fn new(name: impl Into<String>) -> Self {
        ProjectInfo {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a field by its on-disk or Rust name. Returns `false` for unknown fields.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "desc" | "description" => &mut self.description,
            "engineer" => &mut self.engineer,
            "concrete_reg" | "concrete_code" => &mut self.concrete_code,
            "seismic_reg" | "seismic_code" => &mut self.seismic_code,
            "load_reg" | "load_code" => &mut self.load_code,
            "units" => &mut self.units,
            _ => return false,
        };
        *slot = value.into();
        true
    }
}

impl Default for ProjectInfo {
    fn default() -> Self {
        ProjectInfo {
            name: String::new(),
            description: String::new(),
            engineer: String::new(),
            concrete_code: DEFAULT_CONCRETE_CODE.to_string(),
            seismic_code: DEFAULT_SEISMIC_CODE.to_string(),
            load_code: DEFAULT_LOAD_CODE.to_string(),
            units: DEFAULT_UNITS.to_string(),
        }
    }
}

/// One calculation profile.
///
/// The profile's name is its key in the store; `project_info.name` mirrors it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub project_info: ProjectInfo,

    #[serde(default)]
    pub materials: MaterialRegistry,

    #[serde(default)]
    pub sections: SectionRegistry,
}

impl Profile {
    /// Create an empty profile with default project info.
    ///
    /// # Example
    ///
    /// ```rust
    /// use civil_core::profile::Profile;
    ///
    /// let profile = Profile::new("Okul Binası");
    /// assert_eq!(profile.project_info.name, "Okul Binası");
    /// assert_eq!(profile.project_info.concrete_code, "TS 500 (2000)");
    /// assert!(profile.materials.is_empty());
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Profile {
            project_info: ProjectInfo::new(name),
            materials: MaterialRegistry::new(),
            sections: SectionRegistry::new(),
        }
    }

    /// Create or update a material (see [`MaterialRegistry::save`]).
    ///
    /// When an edit renames the material, sections that referenced the old
    /// name follow it to the new one. An edit that turns a concrete still
    /// used by sections into another type is rejected with
    /// `UnresolvedMaterial` and changes nothing.
    pub fn save_material(&mut self, material: Material, editing: Option<&str>) -> CoreResult<()> {
        let new_name = material.user_name.trim().to_string();
        if let Some(original) = editing {
            if !material.is_concrete() {
                if let Some(section) = self.sections.iter().find(|s| s.material_name == original) {
                    return Err(CoreError::unresolved_material(&section.user_name, &new_name));
                }
            }
        }
        self.materials.save(material, editing)?;
        if let Some(original) = editing {
            if original != new_name {
                let moved = self.sections.retarget_material(original, &new_name);
                if moved > 0 {
                    log::info!(
                        "{} section(s) now reference material '{}' (was '{}')",
                        moved,
                        new_name,
                        original
                    );
                }
            }
        }
        Ok(())
    }

    /// Delete a material. Sections that referenced it are left in place and
    /// report `UnresolvedMaterial` when used for a calculation.
    pub fn delete_material(&mut self, user_name: &str) -> CoreResult<Material> {
        let removed = self.materials.delete(user_name)?;
        let orphaned = self
            .sections
            .iter()
            .filter(|s| s.material_name == user_name)
            .count();
        if orphaned > 0 {
            log::warn!(
                "{} section(s) still reference deleted material '{}'",
                orphaned,
                user_name
            );
        }
        Ok(removed)
    }

    /// Create or update a section, checking its material against this profile.
    pub fn save_section(&mut self, section: Section, editing: Option<&str>) -> CoreResult<()> {
        self.sections.save(section, editing, &self.materials)
    }

    pub fn delete_section(&mut self, user_name: &str) -> CoreResult<Section> {
        self.sections.delete(user_name)
    }
}
