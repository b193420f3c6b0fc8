//! # Profile Store
//!
//! In-memory collection of named profiles with exactly one active profile.
//!
//! Invariants held by every public method:
//! - there is always at least one profile
//! - the active name always refers to an existing profile
//! - names are unique (exact, case-sensitive match) and never empty
//!
//! ## Example
//!
//! ```rust
//! use civil_core::store::ProfileStore;
//!
//! let mut store = ProfileStore::new();
//! assert_eq!(store.active_name(), "Default Profile");
//!
//! store.create("Köprü").unwrap();
//! store.set_active("Köprü").unwrap();
//! store.rename("Köprü", "Köprü 2").unwrap();
//! assert_eq!(store.active_name(), "Köprü 2");
//! assert_eq!(store.active().project_info.name, "Köprü 2");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult, EntityKind};
use crate::profile::Profile;
use crate::validation::normalize_name;

/// Name of the profile created when the store would otherwise be empty
pub const DEFAULT_PROFILE_NAME: &str = "Default Profile";

/// Persisted form of the store: profile name → profile
pub type ProfilesDocument = BTreeMap<String, Profile>;

/// What happened to the active profile after a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Name of the removed profile
    pub deleted: String,
    /// Active profile after the delete
    pub active: String,
    /// True when the deleted profile was active; dependent views should reload
    pub active_changed: bool,
}

/// Named profiles plus the active selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileStore {
    profiles: ProfilesDocument,
    active: String,
}

/// Case-insensitive ordering with an exact-match tiebreak so the order is total.
fn name_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b))
}

impl ProfileStore {
    /// A store holding only the default profile.
    pub fn new() -> Self {
        Self::from_profiles(ProfilesDocument::new(), None)
    }

    /// Build a store from a loaded document.
    ///
    /// An empty document gets a fresh [`DEFAULT_PROFILE_NAME`] profile. The
    /// active profile is `preferred_active` when it exists, otherwise the
    /// first name in sorted order.
    pub fn from_profiles(mut profiles: ProfilesDocument, preferred_active: Option<&str>) -> Self {
        if profiles.is_empty() {
            log::info!("No profiles found, creating '{}'", DEFAULT_PROFILE_NAME);
            profiles.insert(
                DEFAULT_PROFILE_NAME.to_string(),
                Profile::new(DEFAULT_PROFILE_NAME),
            );
        }

        let mut store = ProfileStore {
            profiles,
            active: String::new(),
        };
        store.active = match preferred_active {
            Some(name) if store.profiles.contains_key(name) => name.to_string(),
            _ => store.first_name(),
        };
        store
    }

    /// First profile name in list order. The store is never empty.
    fn first_name(&self) -> String {
        self.profiles
            .keys()
            .min_by(|a, b| name_order(a, b))
            .cloned()
            .unwrap_or_default()
    }

    /// Profile names sorted case-insensitively
    pub fn list_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_by(|a, b| name_order(a, b));
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.profiles.get_mut(name)
    }

    /// All profiles, for persistence
    pub fn profiles(&self) -> &ProfilesDocument {
        &self.profiles
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// The active profile
    pub fn active(&self) -> &Profile {
        &self.profiles[&self.active]
    }

    /// The active profile, mutably
    pub fn active_mut(&mut self) -> &mut Profile {
        let name = self.active.clone();
        self.profiles
            .entry(name.clone())
            .or_insert_with(|| Profile::new(name))
    }

    /// Create an empty profile. The active profile does not change.
    ///
    /// # Errors
    ///
    /// `EmptyName` for blank names, `DuplicateName` if the (trimmed) name exists.
    pub fn create(&mut self, name: &str) -> CoreResult<&Profile> {
        let name = normalize_name(EntityKind::Profile, name)?;
        if self.profiles.contains_key(&name) {
            return Err(CoreError::duplicate_name(EntityKind::Profile, name));
        }
        log::info!("Profile '{}' created", name);
        let profile = self
            .profiles
            .entry(name.clone())
            .or_insert_with(|| Profile::new(name));
        Ok(profile)
    }

    /// Rename a profile, keeping it active if it was.
    ///
    /// Renaming to the same name is a successful no-op.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> CoreResult<()> {
        if !self.profiles.contains_key(old_name) {
            return Err(CoreError::not_found(EntityKind::Profile, old_name));
        }
        let new_name = normalize_name(EntityKind::Profile, new_name)?;
        if new_name == old_name {
            return Ok(());
        }
        if self.profiles.contains_key(&new_name) {
            return Err(CoreError::duplicate_name(EntityKind::Profile, new_name));
        }

        if let Some(mut profile) = self.profiles.remove(old_name) {
            profile.project_info.name = new_name.clone();
            self.profiles.insert(new_name.clone(), profile);
        }
        if self.active == old_name {
            self.active = new_name.clone();
        }
        log::info!("Profile '{}' renamed to '{}'", old_name, new_name);
        Ok(())
    }

    /// Delete a profile.
    ///
    /// The last remaining profile cannot be deleted. If the active profile is
    /// deleted, the first remaining name in sorted order becomes active.
    pub fn delete(&mut self, name: &str) -> CoreResult<DeleteOutcome> {
        if !self.profiles.contains_key(name) {
            return Err(CoreError::not_found(EntityKind::Profile, name));
        }
        if self.profiles.len() <= 1 {
            return Err(CoreError::LastProfile {
                name: name.to_string(),
            });
        }

        self.profiles.remove(name);
        let active_changed = self.active == name;
        if active_changed {
            self.active = self.first_name();
            log::info!(
                "Profile '{}' deleted, '{}' is now active",
                name,
                self.active
            );
        } else {
            log::info!("Profile '{}' deleted", name);
        }

        Ok(DeleteOutcome {
            deleted: name.to_string(),
            active: self.active.clone(),
            active_changed,
        })
    }

    /// Select the active profile.
    pub fn set_active(&mut self, name: &str) -> CoreResult<()> {
        if !self.profiles.contains_key(name) {
            return Err(CoreError::not_found(EntityKind::Profile, name));
        }
        self.active = name.to_string();
        log::info!("Profile '{}' selected", name);
        Ok(())
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}
