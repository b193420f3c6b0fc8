//! # Cross-Section Property Formulas
//!
//! Geometric properties of the solid sections a profile can define.
//!
//! ## Notation
//!
//! - `A` = Cross-sectional area
//! - `I` = Moment of inertia (second moment of area)
//! - `b` = Width of section
//! - `h` = Depth (height) of section
//! - `D` = Diameter of a circular section or bar

use std::f64::consts::PI;

// =============================================================================
// RECTANGULAR SECTION PROPERTIES
// =============================================================================

/// Cross-sectional area of a rectangle
///
/// ```text
///     ┌─────────┐
///     │         │
///   h │         │
///     │         │
///     └─────────┘
///          b
/// ```
///
/// # Formula
/// A = b × h
///
/// # Example
/// ```rust
/// use civil_core::equations::section::rectangular_area;
///
/// let area = rectangular_area(300.0, 500.0);
/// assert!((area - 150_000.0).abs() < 1e-9);
/// ```
#[inline]
pub fn rectangular_area(b: f64, h: f64) -> f64 {
    b * h
}

/// Moment of inertia of a rectangle about its centroidal axis parallel to `b`
///
/// # Formula
/// I = b·h³/12
///
/// For the weak axis swap the arguments: I = h·b³/12
#[inline]
pub fn rectangular_moment_of_inertia(b: f64, h: f64) -> f64 {
    b * h.powi(3) / 12.0
}

// =============================================================================
// CIRCULAR SECTION PROPERTIES
// =============================================================================

/// Area of a circle of diameter `d`
///
/// Used both for circular columns and for single reinforcing bars.
///
/// # Formula
/// A = π·D²/4
///
/// # Example
/// ```rust
/// use civil_core::equations::section::circular_area;
///
/// // One Ø16 bar
/// let a = circular_area(16.0);
/// assert!((a - 201.06).abs() < 0.01);
/// ```
#[inline]
pub fn circular_area(d: f64) -> f64 {
    PI * d * d / 4.0
}

/// Moment of inertia of a solid circle about any centroidal axis
///
/// # Formula
/// I = π·D⁴/64
#[inline]
pub fn circular_moment_of_inertia(d: f64) -> f64 {
    PI * d.powi(4) / 64.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangular_area() {
        assert_relative_eq!(rectangular_area(250.0, 500.0), 125_000.0);
    }

    #[test]
    fn test_rectangular_moment_of_inertia() {
        // 300 x 500: I = 300 * 500^3 / 12 = 3.125e9 mm⁴
        assert_relative_eq!(rectangular_moment_of_inertia(300.0, 500.0), 3.125e9);
        // Weak axis: 500 * 300^3 / 12 = 1.125e9 mm⁴
        assert_relative_eq!(rectangular_moment_of_inertia(500.0, 300.0), 1.125e9);
    }

    #[test]
    fn test_circular_properties() {
        // D = 400: A = 125663.7 mm², I = 1.2566e9 mm⁴
        assert_relative_eq!(circular_area(400.0), 125_663.706, max_relative = 1e-6);
        assert_relative_eq!(
            circular_moment_of_inertia(400.0),
            1_256_637_061.4,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_polar_consistency() {
        // For a circle, I = A * r² / 4 with r = D/2
        let d = 350.0;
        let r = d / 2.0;
        assert_relative_eq!(
            circular_moment_of_inertia(d),
            circular_area(d) * r * r / 4.0,
            max_relative = 1e-12
        );
    }
}
