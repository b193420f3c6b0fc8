//! # Section Design Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input) -> CoreResult<*Result>` - Pure calculation function
//!
//! Inputs can be filled by hand or gathered from a [`Profile`](crate::profile::Profile).
//!
//! ## Available Calculations
//!
//! - [`bending`] - Moment capacity of a singly reinforced rectangular section

pub mod bending;

pub use bending::{BendingInput, BendingResult, CapacityStatus, RebarLayout};
