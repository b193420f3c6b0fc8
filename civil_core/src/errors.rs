//! # Error Types
//!
//! Structured error types for civil_core. Every store, registry and
//! calculation operation reports failures through [`CoreError`], so the
//! front end can render a message and, if it wants, branch on
//! [`CoreError::error_code`].
//!
//! ## Example
//!
//! ```rust
//! use civil_core::errors::{CoreError, CoreResult};
//!
//! fn validate_cover(cover_mm: f64) -> CoreResult<()> {
//!     if cover_mm < 0.0 {
//!         return Err(CoreError::invalid_dimensions(
//!             "cover_mm",
//!             cover_mm.to_string(),
//!             "Cover cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for civil_core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// The kind of named entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Profile,
    Material,
    Section,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Profile => "Profile",
            EntityKind::Material => "Material",
            EntityKind::Section => "Section",
        };
        write!(f, "{}", s)
    }
}

/// Structured error type for store, registry and calculation operations.
///
/// All validation variants are produced before any mutation is applied, so
/// receiving one of them means the in-memory store is unchanged.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CoreError {
    /// No entity with this name exists
    #[error("{kind} not found: '{name}'")]
    NotFound { kind: EntityKind, name: String },

    /// Another entity already uses this name
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: EntityKind, name: String },

    /// Name is empty or whitespace only
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: EntityKind },

    /// A numeric field did not parse as a positive finite number
    #[error("Invalid number for '{field}': '{value}'")]
    InvalidNumber { field: String, value: String },

    /// A section dimension or cover is out of range
    #[error("Invalid dimension '{field}': {value} - {reason}")]
    InvalidDimensions {
        field: String,
        value: String,
        reason: String,
    },

    /// A section references a material that is missing or of the wrong type
    #[error("Section '{section}' references unresolved material '{material}'")]
    UnresolvedMaterial { section: String, material: String },

    /// Class name is not in the standard property table
    #[error("Unknown {material_type} class: '{class_name}'")]
    UnknownClass {
        material_type: String,
        class_name: String,
    },

    /// The sole remaining profile cannot be deleted
    #[error("Cannot delete '{name}': at least one profile must remain")]
    LastProfile { name: String },

    /// A derived geometric quantity is out of range (effective depth, block depth)
    #[error("Invalid geometry: {quantity} = {value} - {reason}")]
    InvalidGeometry {
        quantity: String,
        value: String,
        reason: String,
    },

    /// An input value is invalid (out of range, wrong sign, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// The CAD application rejected or could not perform a request
    #[error("CAD error: {operation} - {reason}")]
    Cad { operation: String, reason: String },
}

impl CoreError {
    /// Create a NotFound error
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a DuplicateName error
    pub fn duplicate_name(kind: EntityKind, name: impl Into<String>) -> Self {
        CoreError::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Create an EmptyName error
    pub fn empty_name(kind: EntityKind) -> Self {
        CoreError::EmptyName { kind }
    }

    /// Create an InvalidNumber error
    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::InvalidNumber {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an InvalidDimensions error
    pub fn invalid_dimensions(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidDimensions {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnresolvedMaterial error
    pub fn unresolved_material(section: impl Into<String>, material: impl Into<String>) -> Self {
        CoreError::UnresolvedMaterial {
            section: section.into(),
            material: material.into(),
        }
    }

    /// Create an UnknownClass error
    pub fn unknown_class(material_type: impl Into<String>, class_name: impl Into<String>) -> Self {
        CoreError::UnknownClass {
            material_type: material_type.into(),
            class_name: class_name.into(),
        }
    }

    /// Create an InvalidGeometry error
    pub fn invalid_geometry(
        quantity: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidGeometry {
            quantity: quantity.into(),
            value: format!("{:.2}", value),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        CoreError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a Cad error
    pub fn cad(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::Cad {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (the user can retry the same action)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::FileError { .. } | CoreError::FileLocked { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::DuplicateName { .. } => "DUPLICATE_NAME",
            CoreError::EmptyName { .. } => "EMPTY_NAME",
            CoreError::InvalidNumber { .. } => "INVALID_NUMBER",
            CoreError::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
            CoreError::UnresolvedMaterial { .. } => "UNRESOLVED_MATERIAL",
            CoreError::UnknownClass { .. } => "UNKNOWN_CLASS",
            CoreError::LastProfile { .. } => "LAST_PROFILE",
            CoreError::InvalidGeometry { .. } => "INVALID_GEOMETRY",
            CoreError::InvalidInput { .. } => "INVALID_INPUT",
            CoreError::FileError { .. } => "FILE_ERROR",
            CoreError::FileLocked { .. } => "FILE_LOCKED",
            CoreError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CoreError::Cad { .. } => "CAD_ERROR",
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CoreError::duplicate_name(EntityKind::Material, "Beton Ç");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"DuplicateName\""));
        let roundtrip: CoreError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CoreError::empty_name(EntityKind::Profile).error_code(),
            "EMPTY_NAME"
        );
        assert_eq!(
            CoreError::LastProfile {
                name: "P".to_string()
            }
            .error_code(),
            "LAST_PROFILE"
        );
        assert_eq!(
            CoreError::unknown_class("Concrete", "C99/105").error_code(),
            "UNKNOWN_CLASS"
        );
    }

    #[test]
    fn test_display_messages() {
        let err = CoreError::not_found(EntityKind::Section, "K-1");
        assert_eq!(err.to_string(), "Section not found: 'K-1'");

        let err = CoreError::invalid_geometry("d", -4.0, "Effective depth must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid geometry: d = -4.00 - Effective depth must be positive"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(CoreError::file_error("write", "profiles.json", "disk full").is_recoverable());
        assert!(!CoreError::empty_name(EntityKind::Section).is_recoverable());
    }
}
