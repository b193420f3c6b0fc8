//! # File I/O Module
//!
//! JSON document persistence with safety features:
//! - **Self-healing loads**: a missing or unreadable document falls back to
//!   defaults instead of failing
//! - **Atomic saves**: write to `.tmp`, sync, rename over the target
//! - **File locking**: advisory `.lock` files so two instances do not edit
//!   the same profiles file
//!
//! Documents are pretty printed with a 4-space indent and non-ASCII text is
//! written as-is (UTF-8).
//!
//! ## Example
//!
//! ```rust,no_run
//! use civil_core::file_io::{load_document, save_document, FileLock, LoadStatus};
//! use civil_core::settings::AppSettings;
//! use std::path::Path;
//!
//! let path = Path::new("settings.json");
//! let loaded = load_document(path, AppSettings::default());
//! if loaded.status == LoadStatus::Missing {
//!     save_document(path, &loaded.doc).unwrap();
//! }
//!
//! let lock = FileLock::acquire(Path::new("profiles.json"), "engineer").unwrap();
//! drop(lock); // lock file removed
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::errors::{CoreError, CoreResult};

/// How a document came back from [`load_document`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Parsed from disk
    Loaded,
    /// No file on disk; defaults returned, nothing written
    Missing,
    /// File was corrupt or unreadable; defaults returned (and written back
    /// when the file could be read at all)
    Recovered(String),
}

/// A loaded document together with how it was obtained
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub doc: T,
    pub status: LoadStatus,
}

impl<T> Loaded<T> {
    /// True when the document came from the file as written
    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }
}

/// Load a JSON document, falling back to `default` when it cannot be used.
///
/// The top level must be a non-empty JSON object that deserializes into `T`.
/// Anything else counts as corruption: the bad contents are copied to
/// `<file>.bak`, then the default is returned and immediately saved over the
/// file. A failed backup or self-heal write is logged and otherwise ignored.
///
/// A missing file is not an error and is not written here.
pub fn load_document<T>(path: &Path, default: T) -> Loaded<T>
where
    T: Serialize + DeserializeOwned,
{
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("{} not found, using defaults", path.display());
            return Loaded {
                doc: default,
                status: LoadStatus::Missing,
            };
        }
        Err(e) => {
            log::warn!("Could not read {}: {}, using defaults", path.display(), e);
            return Loaded {
                doc: default,
                status: LoadStatus::Recovered(e.to_string()),
            };
        }
    };

    match parse_document::<T>(&contents) {
        Ok(doc) => {
            log::info!("Loaded {}", path.display());
            Loaded {
                doc,
                status: LoadStatus::Loaded,
            }
        }
        Err(reason) => {
            log::warn!(
                "{} is corrupt ({}), restoring defaults",
                path.display(),
                reason
            );
            let backup = sibling_path(path, "bak");
            match fs::write(&backup, &contents) {
                Ok(()) => log::info!("Kept the unreadable file as {}", backup.display()),
                Err(e) => log::warn!("Could not write {}: {}", backup.display(), e),
            }
            if let Err(e) = save_document(path, &default) {
                log::warn!("Could not restore {}: {}", path.display(), e);
            }
            Loaded {
                doc: default,
                status: LoadStatus::Recovered(reason),
            }
        }
    }
}

fn parse_document<T: DeserializeOwned>(contents: &str) -> Result<T, String> {
    let value: Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    match &value {
        Value::Object(map) if map.is_empty() => return Err("empty document".to_string()),
        Value::Object(_) => {}
        _ => return Err("top level is not an object".to_string()),
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Serialize with a 4-space indent.
pub fn to_pretty_json<T: Serialize>(doc: &T) -> CoreResult<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| CoreError::SerializationError {
        reason: e.to_string(),
    })
}

/// Save a document with atomic write semantics.
///
/// The save process:
/// 1. Serialize to 4-space pretty JSON
/// 2. Write to `<file>.tmp`
/// 3. Sync to disk
/// 4. Rename over the target
///
/// The whole document is replaced; an interrupted save leaves the previous
/// file intact.
pub fn save_document<T: Serialize>(path: &Path, doc: &T) -> CoreResult<()> {
    let json = to_pretty_json(doc)?;
    let tmp_path = sibling_path(path, "tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CoreError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CoreError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CoreError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CoreError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    log::debug!("Saved {}", path.display());
    Ok(())
}

/// `profiles.json` → `profiles.json.<suffix>`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let extension = sibling
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    sibling.set_extension(extension);
    sibling
}

/// Lock file path for a document
pub fn lock_path_for(path: &Path) -> PathBuf {
    sibling_path(path, "lock")
}

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier
    pub user_id: String,
    /// Machine name where the lock was taken
    pub machine: String,
    /// Process holding the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// "user (machine)" for messages
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a document, released on drop.
///
/// Combines an OS-level lock (fs2) held for the guard's lifetime with a
/// `.lock` file whose JSON body says who holds it.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`.
    ///
    /// A stale lock (see [`is_lock_stale`]) is taken over.
    ///
    /// # Errors
    ///
    /// `FileLocked` if another live process holds it, `FileError` if the lock
    /// file cannot be written.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CoreResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = Self::check(path) {
            return Err(CoreError::file_locked(
                path.display().to_string(),
                existing.holder(),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                CoreError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CoreError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            CoreError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;
        lock_file.sync_all().map_err(|e| {
            CoreError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        log::debug!("Locked {}", path.display());
        Ok(FileLock {
            path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Report a live lock on `path` without acquiring it.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path)
            .ok()
            .filter(|info| !is_lock_stale(info))
    }

    /// The locked document
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // OS lock goes with the file handle
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn read_lock_info(lock_path: &Path) -> CoreResult<LockInfo> {
    let mut file = File::open(lock_path).map_err(|e| {
        CoreError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        CoreError::file_error("read lock", lock_path.display().to_string(), e.to_string())
    })?;

    Ok(serde_json::from_str(&contents)?)
}

/// A lock is stale when its process is gone (same machine only) or it is
/// more than 24 hours old.
pub fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine && !process_alive(info.pid) {
            return true;
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    fs::metadata(format!("/proc/{}", pid)).is_ok()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}
