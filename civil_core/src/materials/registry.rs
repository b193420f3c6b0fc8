//! Per-profile material list with name uniqueness.
//!
//! Insertion order is the order materials were created; list views sort
//! with [`MaterialRegistry::names_sorted`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CoreError, CoreResult, EntityKind};
use crate::materials::{Material, MaterialType};

/// Named materials belonging to one profile.
///
/// Serializes as a plain JSON array. Records that do not parse and duplicate
/// names found while loading are dropped with a warning (first one wins), so
/// one bad entry never costs the rest of the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Material>")]
pub struct MaterialRegistry {
    items: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.items.iter()
    }

    pub fn get(&self, user_name: &str) -> Option<&Material> {
        self.items.iter().find(|m| m.user_name == user_name)
    }

    pub fn contains(&self, user_name: &str) -> bool {
        self.get(user_name).is_some()
    }

    fn position(&self, user_name: &str) -> Option<usize> {
        self.items.iter().position(|m| m.user_name == user_name)
    }

    /// Materials of one type, in insertion order
    pub fn of_type(&self, material_type: MaterialType) -> impl Iterator<Item = &Material> {
        self.items
            .iter()
            .filter(move |m| m.material_type() == material_type)
    }

    pub fn concrete(&self) -> impl Iterator<Item = &Material> {
        self.of_type(MaterialType::Concrete)
    }

    pub fn rebar(&self) -> impl Iterator<Item = &Material> {
        self.of_type(MaterialType::RebarSteel)
    }

    /// Find a concrete material by name. Steel with the same name does not match.
    pub fn resolve_concrete(&self, user_name: &str) -> Option<&Material> {
        self.get(user_name).filter(|m| m.is_concrete())
    }

    /// Find a reinforcing steel by name.
    pub fn resolve_rebar(&self, user_name: &str) -> Option<&Material> {
        self.get(user_name)
            .filter(|m| m.material_type() == MaterialType::RebarSteel)
    }

    /// Names sorted case-insensitively, for list views
    pub fn names_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.items.iter().map(|m| m.user_name.as_str()).collect();
        names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));
        names
    }

    /// Create or update a material.
    ///
    /// * `editing = None` creates a new entry; the name must be free.
    /// * `editing = Some(original)` replaces the entry named `original` in
    ///   place. The material may carry a different name (an explicit rename),
    ///   which must not collide with any other entry.
    ///
    /// All checks run before the list is touched.
    ///
    /// # Errors
    ///
    /// `EmptyName`, `InvalidNumber`, `UnknownClass` from validation;
    /// `NotFound` if `original` does not exist; `DuplicateName` on a name
    /// collision.
    pub fn save(&mut self, material: Material, editing: Option<&str>) -> CoreResult<()> {
        let material = material.validated()?;
        match editing {
            Some(original) => {
                let index = self
                    .position(original)
                    .ok_or_else(|| CoreError::not_found(EntityKind::Material, original))?;
                if material.user_name != original && self.contains(&material.user_name) {
                    return Err(CoreError::duplicate_name(
                        EntityKind::Material,
                        &material.user_name,
                    ));
                }
                log::info!("Material '{}' updated", material.user_name);
                self.items[index] = material;
            }
            None => {
                if self.contains(&material.user_name) {
                    return Err(CoreError::duplicate_name(
                        EntityKind::Material,
                        &material.user_name,
                    ));
                }
                log::info!("Material '{}' added", material.user_name);
                self.items.push(material);
            }
        }
        Ok(())
    }

    /// Remove a material by name, returning it.
    pub fn delete(&mut self, user_name: &str) -> CoreResult<Material> {
        let index = self
            .position(user_name)
            .ok_or_else(|| CoreError::not_found(EntityKind::Material, user_name))?;
        log::info!("Material '{}' deleted", user_name);
        Ok(self.items.remove(index))
    }
}

impl From<Vec<Value>> for MaterialRegistry {
    fn from(records: Vec<Value>) -> Self {
        let mut registry = MaterialRegistry::new();
        for record in records {
            let material: Material = match serde_json::from_value(record) {
                Ok(material) => material,
                Err(e) => {
                    log::warn!("Skipping unreadable material record: {}", e);
                    continue;
                }
            };
            if registry.contains(&material.user_name) {
                log::warn!(
                    "Dropping duplicate material '{}' while loading",
                    material.user_name
                );
                continue;
            }
            registry.items.push(material);
        }
        registry
    }
}

impl From<MaterialRegistry> for Vec<Material> {
    fn from(registry: MaterialRegistry) -> Self {
        registry.items
    }
}
