//! # civil_core - Profile Store and Section Design Engine
//!
//! `civil_core` keeps a civil engineer's calculation profiles (project
//! metadata, materials, cross-sections) and runs reinforced-concrete section
//! checks against them. All data types are JSON-serializable and persisted
//! in plain JSON files next to the application.
//!
//! ## Design Philosophy
//!
//! - **No globals**: [`app::AppContext`] owns the settings, store and paths
//! - **Validate before mutate**: a failed save leaves everything unchanged
//! - **Rich Errors**: one structured [`CoreError`] with stable codes
//! - **Tolerant files**: missing or corrupt documents fall back to defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use civil_core::calculations::bending::{calculate, BendingInput, RebarLayout};
//! use civil_core::materials::{Material, MaterialType};
//! use civil_core::sections::Section;
//! use civil_core::store::ProfileStore;
//!
//! let mut store = ProfileStore::new();
//! let profile = store.active_mut();
//! profile
//!     .save_material(Material::standard("C25", MaterialType::Concrete, "C25/30").unwrap(), None)
//!     .unwrap();
//! profile
//!     .save_material(Material::standard("S420", MaterialType::RebarSteel, "B420C").unwrap(), None)
//!     .unwrap();
//! profile
//!     .save_section(Section::rectangular("K1", 300.0, 500.0, "C25", 30.0), None)
//!     .unwrap();
//!
//! let input = BendingInput::from_profile(
//!     store.active(), "K1", "S420", RebarLayout::new(3, 16.0), 10.0, 80.0,
//! ).unwrap();
//! let result = calculate(&input).unwrap();
//! assert!(result.passes());
//! ```
//!
//! ## Modules
//!
//! - [`app`] - Application context (settings, store, file lock)
//! - [`store`] - Named profiles with an active selection
//! - [`profile`] - Project info plus material and section registries
//! - [`materials`] - Concrete and rebar materials, standard class tables
//! - [`sections`] - Rectangular and circular cross-sections
//! - [`forms`] - Text-field forms producing materials and sections
//! - [`calculations`] - Section capacity checks
//! - [`equations`] - Section property and flexure formulas
//! - [`cad`] - Interface to an external CAD program
//! - [`settings`] - Theme, window geometry, last profile
//! - [`file_io`] - JSON documents with atomic saves and locking
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod app;
pub mod cad;
pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod forms;
pub mod materials;
pub mod profile;
pub mod sections;
pub mod settings;
pub mod store;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use app::AppContext;
pub use errors::{CoreError, CoreResult, EntityKind};
pub use file_io::{load_document, save_document, FileLock};
pub use profile::{Profile, ProjectInfo};
pub use store::ProfileStore;
