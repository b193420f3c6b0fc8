//! # Structural Engineering Equations
//!
//! Fundamental formulas used by the section registry and the bending check.
//! Keeping them in one place makes them easy to verify against TS 500 and
//! hand calculations.
//!
//! ## Modules
//!
//! - [`section`] - Cross-section properties (A, I) for rectangles and circles
//! - [`flexure`] - Rectangular stress block formulas for singly reinforced sections
//!
//! ## Conventions
//!
//! - Lengths in mm, stresses in MPa (N/mm²), moments in N·mm
//! - Bending about the section's x axis (horizontal); `b` is the width
//!   parallel to that axis, `h` the depth perpendicular to it
//!
//! ## References
//!
//! - TS 500 (2000): Requirements for Design and Construction of Reinforced Concrete Structures
//! - Roark's Formulas for Stress and Strain, 8th Edition

pub mod flexure;
pub mod section;
