//! # Application Context
//!
//! One object built at startup that owns everything the front end works
//! with: the settings, the profile store, the data file paths and the lock
//! on `profiles.json`. There is no global state; front ends pass the context
//! around.
//!
//! Startup sequence:
//! 1. Load `settings.json` (defaults if missing or corrupt)
//! 2. Lock `profiles.json`; if someone else holds it, open read-only
//! 3. Load `profiles.json`; write the default document if it was missing
//! 4. Activate the last used profile, or the first one
//!
//! ## Example
//!
//! ```rust,no_run
//! use civil_core::app::AppContext;
//! use std::path::Path;
//!
//! let mut app = AppContext::open(Path::new(".")).unwrap();
//! app.create_profile("Köprü").unwrap();
//! assert_eq!(app.store().active_name(), "Köprü");
//! ```

use std::path::{Path, PathBuf};

use crate::errors::{CoreError, CoreResult};
use crate::file_io::{load_document, save_document, FileLock, LoadStatus, LockInfo};
use crate::settings::{AppSettings, Theme, SETTINGS_FILE};
use crate::store::{DeleteOutcome, ProfileStore, ProfilesDocument};

pub const PROFILES_FILE: &str = "profiles.json";

/// User name recorded in lock files
fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Everything the running application holds.
#[derive(Debug)]
pub struct AppContext {
    data_dir: PathBuf,
    settings: AppSettings,
    store: ProfileStore,
    lock: Option<FileLock>,
    /// Holder of the lock when opened read-only
    locked_by: Option<LockInfo>,
}

impl AppContext {
    /// Open the data files in `data_dir`.
    ///
    /// Never fails because of missing or corrupt files; those fall back to
    /// defaults. Errors only when the default profiles file cannot be
    /// written into a writable session.
    pub fn open(data_dir: &Path) -> CoreResult<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        let profiles_path = data_dir.join(PROFILES_FILE);

        let settings = load_document(&settings_path, AppSettings::default()).doc;

        let (lock, locked_by) = match FileLock::acquire(&profiles_path, current_user()) {
            Ok(lock) => (Some(lock), None),
            Err(e) => {
                log::warn!("Opening read-only: {}", e);
                let holder = FileLock::check(&profiles_path)
                    .unwrap_or_else(|| LockInfo::new("unknown"));
                (None, Some(holder))
            }
        };

        let default_doc = ProfileStore::new().profiles().clone();
        let loaded = load_document::<ProfilesDocument>(&profiles_path, default_doc);
        if loaded.status == LoadStatus::Missing && lock.is_some() {
            save_document(&profiles_path, &loaded.doc)?;
            log::info!("Created {}", profiles_path.display());
        }

        let store = ProfileStore::from_profiles(loaded.doc, settings.last_profile.as_deref());
        log::info!(
            "{} profile(s) loaded, active: '{}'",
            store.len(),
            store.active_name()
        );

        Ok(AppContext {
            data_dir: data_dir.to_path_buf(),
            settings,
            store,
            lock,
            locked_by,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join(PROFILES_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Mutable store access. Call [`AppContext::save_profiles`] afterwards.
    pub fn store_mut(&mut self) -> &mut ProfileStore {
        &mut self.store
    }

    /// True when another session holds the profiles lock
    pub fn is_read_only(&self) -> bool {
        self.lock.is_none()
    }

    pub fn locked_by(&self) -> Option<&LockInfo> {
        self.locked_by.as_ref()
    }

    /// Write every profile to `profiles.json`.
    ///
    /// # Errors
    ///
    /// `FileLocked` in a read-only session, `FileError` if the write fails.
    /// In-memory state is kept either way.
    pub fn save_profiles(&self) -> CoreResult<()> {
        if self.is_read_only() {
            let holder = self
                .locked_by
                .as_ref()
                .map(|info| (info.holder(), info.locked_at.to_rfc3339()))
                .unwrap_or_else(|| ("another session".to_string(), "unknown".to_string()));
            return Err(CoreError::file_locked(
                self.profiles_path().display().to_string(),
                holder.0,
                holder.1,
            ));
        }
        save_document(&self.profiles_path(), self.store.profiles())
    }

    /// Write `settings.json`, recording the active profile.
    pub fn save_settings(&mut self) -> CoreResult<()> {
        self.settings.last_profile = Some(self.store.active_name().to_string());
        save_document(&self.settings_path(), &self.settings)
    }

    /// Create a profile, make it active and persist.
    pub fn create_profile(&mut self, name: &str) -> CoreResult<String> {
        let name = self.store.create(name)?.project_info.name.clone();
        self.store.set_active(&name)?;
        self.persist_all()?;
        Ok(name)
    }

    /// Switch the active profile and remember it.
    pub fn select_profile(&mut self, name: &str) -> CoreResult<()> {
        self.store.set_active(name)?;
        self.save_settings()
    }

    pub fn rename_profile(&mut self, old_name: &str, new_name: &str) -> CoreResult<()> {
        self.store.rename(old_name, new_name)?;
        self.persist_all()
    }

    pub fn delete_profile(&mut self, name: &str) -> CoreResult<DeleteOutcome> {
        let outcome = self.store.delete(name)?;
        self.persist_all()?;
        Ok(outcome)
    }

    pub fn set_theme(&mut self, theme: Theme) -> CoreResult<()> {
        self.settings.theme = theme;
        self.save_settings()
    }

    fn persist_all(&mut self) -> CoreResult<()> {
        self.save_profiles()?;
        self.save_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Material, MaterialType};
    use crate::store::DEFAULT_PROFILE_NAME;
    use std::fs;

    #[test]
    fn test_first_start_writes_default_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let app = AppContext::open(dir.path()).unwrap();

        assert!(!app.is_read_only());
        assert_eq!(app.store().active_name(), DEFAULT_PROFILE_NAME);
        assert!(dir.path().join(PROFILES_FILE).exists());
        // Settings are only written on change
        assert!(!dir.path().join(SETTINGS_FILE).exists());
    }

    #[test]
    fn test_changes_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut app = AppContext::open(dir.path()).unwrap();
            app.create_profile("Köprü").unwrap();
            app.store_mut()
                .active_mut()
                .save_material(
                    Material::standard("C30", MaterialType::Concrete, "C30/37").unwrap(),
                    None,
                )
                .unwrap();
            app.save_profiles().unwrap();
            app.set_theme(Theme::Dark).unwrap();
        }

        let app = AppContext::open(dir.path()).unwrap();
        assert_eq!(app.store().len(), 2);
        assert_eq!(app.store().active_name(), "Köprü");
        assert!(app.store().active().materials.contains("C30"));
        assert_eq!(app.settings().theme, Theme::Dark);
    }

    #[test]
    fn test_corrupt_profiles_recovered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROFILES_FILE), "{ broken").unwrap();

        let app = AppContext::open(dir.path()).unwrap();
        assert_eq!(app.store().list_names(), vec![DEFAULT_PROFILE_NAME]);

        let raw = fs::read_to_string(dir.path().join(PROFILES_FILE)).unwrap();
        assert!(raw.contains(DEFAULT_PROFILE_NAME));
    }

    #[test]
    fn test_opens_file_written_by_earlier_versions() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{
            "Köprü": {
                "project_info": {"name": "Köprü", "desc": "", "engineer": "Ayşe",
                                 "concrete_reg": "TS 500 (2000)"},
                "materials": [
                    {"user_name": "C25", "type": "Beton", "class": "C25/30",
                     "is_custom": false, "props": {"fck": 25.0}},
                    {"user_name": "Eksik", "type": "Donatı Çeliği", "class": "B420C",
                     "is_custom": false, "props": {}}
                ],
                "sections": [
                    {"user_name": "K1", "type": "Dikdörtgen", "material_name": "C25",
                     "dimensions": {"b": 300.0, "h": 500.0}},
                    {"user_name": "Bozuk", "type": "Dairesel", "material_name": "C25",
                     "dimensions": {}}
                ]
            },
            "Hastane": {"project_info": {"name": "Hastane"}, "materials": [], "sections": []}
        }"#;
        fs::write(dir.path().join(PROFILES_FILE), raw).unwrap();

        let app = AppContext::open(dir.path()).unwrap();
        assert_eq!(app.store().list_names(), vec!["Hastane", "Köprü"]);

        let bridge = app.store().get("Köprü").unwrap();
        assert_eq!(bridge.project_info.engineer, "Ayşe");
        assert_eq!(bridge.materials.len(), 1);
        assert_eq!(bridge.sections.len(), 1);
        let k1 = bridge.sections.get("K1").unwrap();
        assert_eq!(k1.cover_mm, crate::sections::DEFAULT_COVER_MM);
        assert!(bridge.sections.unresolved(&bridge.materials).is_empty());

        // Nothing was reset
        let on_disk = fs::read_to_string(dir.path().join(PROFILES_FILE)).unwrap();
        assert!(on_disk.contains("Hastane"));
        assert!(!dir.path().join("profiles.json.bak").exists());
    }

    #[test]
    fn test_stale_last_profile_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme": "light", "window_geometry": "1100x700+100+50", "last_profile": "Gone"}"#,
        )
        .unwrap();

        let app = AppContext::open(dir.path()).unwrap();
        assert_eq!(app.store().active_name(), DEFAULT_PROFILE_NAME);
        assert_eq!(app.settings().theme, Theme::Light);
    }

    #[test]
    fn test_second_session_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let first = AppContext::open(dir.path()).unwrap();
        assert!(!first.is_read_only());

        // Same process, so make the lock look like it belongs to another machine
        let lock_path = crate::file_io::lock_path_for(&first.profiles_path());
        let mut info: LockInfo = serde_json::from_str(&fs::read_to_string(&lock_path).unwrap()).unwrap();
        info.machine = "another-machine".to_string();
        fs::write(&lock_path, serde_json::to_string(&info).unwrap()).unwrap();

        let mut second = AppContext::open(dir.path()).unwrap();
        assert!(second.is_read_only());
        assert!(second.locked_by().is_some());

        let err = second.create_profile("X").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        // The in-memory change is kept
        assert!(second.store().contains("X"));
        drop(first);
    }

    #[test]
    fn test_delete_active_profile_persists_new_active() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = AppContext::open(dir.path()).unwrap();
        app.create_profile("Alfa").unwrap();

        let outcome = app.delete_profile("Alfa").unwrap();
        assert!(outcome.active_changed);
        assert_eq!(app.settings().last_profile.as_deref(), Some(DEFAULT_PROFILE_NAME));
    }
}
