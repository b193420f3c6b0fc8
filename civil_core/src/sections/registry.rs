//! Per-profile section list with name uniqueness and material references.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CoreError, CoreResult, EntityKind};
use crate::materials::MaterialRegistry;
use crate::sections::{GeometryType, Section};

/// Named sections belonging to one profile.
///
/// Serializes as a plain JSON array. Unreadable records and duplicate names
/// are dropped on load with a warning.
/// Material references are not checked on load, only on save and at
/// calculation time, so a file edited by hand still opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Section>")]
pub struct SectionRegistry {
    items: Vec<Section>,
}

impl SectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.items.iter()
    }

    pub fn get(&self, user_name: &str) -> Option<&Section> {
        self.items.iter().find(|s| s.user_name == user_name)
    }

    pub fn contains(&self, user_name: &str) -> bool {
        self.get(user_name).is_some()
    }

    fn position(&self, user_name: &str) -> Option<usize> {
        self.items.iter().position(|s| s.user_name == user_name)
    }

    /// Sections of one geometry type, in insertion order
    pub fn list_by_geometry(&self, geometry_type: GeometryType) -> Vec<&Section> {
        self.items
            .iter()
            .filter(|s| s.geometry_type() == geometry_type)
            .collect()
    }

    /// Rectangular sections (the ones eligible for the bending check)
    pub fn list_rectangular(&self) -> Vec<&Section> {
        self.list_by_geometry(GeometryType::Rectangular)
    }

    /// Sections sorted case-insensitively by name, for list views
    pub fn sorted(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.items.iter().collect();
        sections.sort_by(|a, b| {
            a.user_name
                .to_lowercase()
                .cmp(&b.user_name.to_lowercase())
                .then(a.user_name.cmp(&b.user_name))
        });
        sections
    }

    /// Create or update a section.
    ///
    /// Same `editing` semantics as [`MaterialRegistry::save`]. The material
    /// reference must name a concrete material in `materials`.
    ///
    /// # Errors
    ///
    /// `EmptyName`, `InvalidDimensions`, `UnresolvedMaterial` from validation;
    /// `NotFound` if `original` does not exist; `DuplicateName` on a name
    /// collision.
    pub fn save(
        &mut self,
        section: Section,
        editing: Option<&str>,
        materials: &MaterialRegistry,
    ) -> CoreResult<()> {
        let section = section.validated(materials)?;
        match editing {
            Some(original) => {
                let index = self
                    .position(original)
                    .ok_or_else(|| CoreError::not_found(EntityKind::Section, original))?;
                if section.user_name != original && self.contains(&section.user_name) {
                    return Err(CoreError::duplicate_name(
                        EntityKind::Section,
                        &section.user_name,
                    ));
                }
                log::info!("Section '{}' updated", section.user_name);
                self.items[index] = section;
            }
            None => {
                if self.contains(&section.user_name) {
                    return Err(CoreError::duplicate_name(
                        EntityKind::Section,
                        &section.user_name,
                    ));
                }
                log::info!("Section '{}' added", section.user_name);
                self.items.push(section);
            }
        }
        Ok(())
    }

    /// Remove a section by name, returning it.
    pub fn delete(&mut self, user_name: &str) -> CoreResult<Section> {
        let index = self
            .position(user_name)
            .ok_or_else(|| CoreError::not_found(EntityKind::Section, user_name))?;
        log::info!("Section '{}' deleted", user_name);
        Ok(self.items.remove(index))
    }

    /// Point every section that references `old` at `new`.
    ///
    /// Returns how many sections changed.
    pub(crate) fn retarget_material(&mut self, old: &str, new: &str) -> usize {
        let mut changed = 0;
        for section in self.items.iter_mut().filter(|s| s.material_name == old) {
            section.material_name = new.to_string();
            changed += 1;
        }
        changed
    }

    /// Names of sections whose material reference no longer resolves
    pub fn unresolved(&self, materials: &MaterialRegistry) -> Vec<&str> {
        self.items
            .iter()
            .filter(|s| materials.resolve_concrete(&s.material_name).is_none())
            .map(|s| s.user_name.as_str())
            .collect()
    }
}

impl From<Vec<Value>> for SectionRegistry {
    fn from(records: Vec<Value>) -> Self {
        let mut registry = SectionRegistry::new();
        for record in records {
            let section: Section = match serde_json::from_value(record) {
                Ok(section) => section,
                Err(e) => {
                    log::warn!("Skipping unreadable section record: {}", e);
                    continue;
                }
            };
            if registry.contains(&section.user_name) {
                log::warn!(
                    "Dropping duplicate section '{}' while loading",
                    section.user_name
                );
                continue;
            }
            registry.items.push(section);
        }
        registry
    }
}

impl From<SectionRegistry> for Vec<Section> {
    fn from(registry: SectionRegistry) -> Self {
        registry.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Material, MaterialType};

    fn materials() -> MaterialRegistry {
        let mut reg = MaterialRegistry::new();
        reg.save(
            Material::standard("Beton C25", MaterialType::Concrete, "C25/30").unwrap(),
            None,
        )
        .unwrap();
        reg.save(Material::custom_concrete("Beton Özel", 32.0), None)
            .unwrap();
        reg
    }

    #[test]
    fn test_add_and_filter() {
        let mats = materials();
        let mut reg = SectionRegistry::new();
        reg.save(
            Section::rectangular("K1", 300.0, 500.0, "Beton C25", 30.0),
            None,
            &mats,
        )
        .unwrap();
        reg.save(Section::circular("S1", 400.0, "Beton C25", 40.0), None, &mats)
            .unwrap();
        reg.save(
            Section::rectangular("K2", 250.0, 600.0, "Beton Özel", 25.0),
            None,
            &mats,
        )
        .unwrap();

        let rect: Vec<_> = reg.list_rectangular().iter().map(|s| s.user_name.as_str()).collect();
        assert_eq!(rect, vec!["K1", "K2"]);
        assert_eq!(reg.list_by_geometry(GeometryType::Circular).len(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mats = materials();
        let mut reg = SectionRegistry::new();
        reg.save(
            Section::rectangular("K1", 300.0, 500.0, "Beton C25", 30.0),
            None,
            &mats,
        )
        .unwrap();
        let before = reg.clone();
        let err = reg
            .save(Section::circular("K1", 400.0, "Beton C25", 30.0), None, &mats)
            .unwrap_err();
        assert_eq!(err, CoreError::duplicate_name(EntityKind::Section, "K1"));
        assert_eq!(reg, before);
    }

    #[test]
    fn test_invalid_section_leaves_registry_unchanged() {
        let mats = materials();
        let mut reg = SectionRegistry::new();
        reg.save(
            Section::rectangular("K1", 300.0, 500.0, "Beton C25", 30.0),
            None,
            &mats,
        )
        .unwrap();
        let before = reg.clone();

        let err = reg
            .save(
                Section::rectangular("K1", 300.0, -1.0, "Beton C25", 30.0),
                Some("K1"),
                &mats,
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DIMENSIONS");

        let err = reg
            .save(
                Section::rectangular("K2", 300.0, 500.0, "Missing", 30.0),
                None,
                &mats,
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "UNRESOLVED_MATERIAL");
        assert_eq!(reg, before);
    }

    #[test]
    fn test_update_and_rename() {
        let mats = materials();
        let mut reg = SectionRegistry::new();
        reg.save(
            Section::rectangular("K1", 300.0, 500.0, "Beton C25", 30.0),
            None,
            &mats,
        )
        .unwrap();

        reg.save(
            Section::rectangular("K1", 300.0, 550.0, "Beton C25", 30.0),
            Some("K1"),
            &mats,
        )
        .unwrap();
        assert_eq!(reg.len(), 1);

        reg.save(
            Section::rectangular("K1-new", 300.0, 550.0, "Beton C25", 30.0),
            Some("K1"),
            &mats,
        )
        .unwrap();
        assert!(reg.get("K1").is_none());
        assert!(reg.get("K1-new").is_some());

        let err = reg
            .save(
                Section::rectangular("K9", 300.0, 550.0, "Beton C25", 30.0),
                Some("K1"),
                &mats,
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_delete() {
        let mats = materials();
        let mut reg = SectionRegistry::new();
        reg.save(Section::circular("S1", 400.0, "Beton C25", 40.0), None, &mats)
            .unwrap();
        assert!(reg.delete("S1").is_ok());
        assert_eq!(
            reg.delete("S1").unwrap_err(),
            CoreError::not_found(EntityKind::Section, "S1")
        );
    }

    #[test]
    fn test_retarget_and_unresolved() {
        let mut mats = materials();
        let mut reg = SectionRegistry::new();
        reg.save(
            Section::rectangular("K1", 300.0, 500.0, "Beton C25", 30.0),
            None,
            &mats,
        )
        .unwrap();
        reg.save(Section::circular("S1", 400.0, "Beton C25", 40.0), None, &mats)
            .unwrap();

        mats.delete("Beton C25").unwrap();
        assert_eq!(reg.unresolved(&mats), vec!["K1", "S1"]);

        assert_eq!(reg.retarget_material("Beton C25", "Beton Özel"), 2);
        assert!(reg.unresolved(&mats).is_empty());
    }

    #[test]
    fn test_deserialize_skips_bad_records() {
        let json = r#"[
            {"user_name": "K1", "type": "Dikdörtgen", "material_name": "Beton C25",
             "dimensions": {"b": 300.0, "h": 500.0}},
            {"user_name": "Boyutsuz", "type": "Dairesel", "material_name": "Beton C25",
             "dimensions": {}},
            {"user_name": "Üçgen", "type": "Üçgen", "dimensions": {"a": 1.0}},
            {"user_name": "S1", "geometry_type": "Circular", "material_name": "Beton C25",
             "dimensions": {"D": 400.0}, "cover_mm": 40.0}
        ]"#;
        let reg: SectionRegistry = serde_json::from_str(json).unwrap();
        let names: Vec<_> = reg.iter().map(|s| s.user_name.as_str()).collect();
        assert_eq!(names, vec!["K1", "S1"]);
        assert!(reg.unresolved(&materials()).is_empty());
    }

    #[test]
    fn test_sorted() {
        let mats = materials();
        let mut reg = SectionRegistry::new();
        for name in ["kolon", "Kiriş", "Döşeme"] {
            reg.save(
                Section::rectangular(name, 300.0, 500.0, "Beton C25", 30.0),
                None,
                &mats,
            )
            .unwrap();
        }
        let names: Vec<_> = reg.sorted().iter().map(|s| s.user_name.as_str()).collect();
        assert_eq!(names, vec!["Döşeme", "Kiriş", "kolon"]);
    }
}
