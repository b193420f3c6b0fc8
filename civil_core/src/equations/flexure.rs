//! # Flexure Formulas (Singly Reinforced Rectangular Section)
//!
//! Equivalent rectangular stress block per TS 500 Section 7.1, simplified to
//! a section with tension reinforcement only.
//!
//! ```text
//!   ┌───────────────┐ ─┬─            0.85·fcd
//!   │░░░░░░░░░░░░░░░│  │ a   ──►  ███████████
//!   │               │  │
//!   │               │  d
//!   │               │  │
//!   │   ●   ●   ●   │ ─┴─ As·fyd ◄──
//!   └───────────────┘
//!           b
//! ```

/// Partial safety factor for concrete (γmc)
pub const GAMMA_CONCRETE: f64 = 1.5;

/// Partial safety factor for reinforcing steel (γms)
pub const GAMMA_STEEL: f64 = 1.15;

/// Stress block intensity factor applied to fcd
pub const STRESS_BLOCK_FACTOR: f64 = 0.85;

/// Ratio of stress block depth to neutral axis depth (k1) for fck ≤ 50 MPa
pub const K1: f64 = 0.85;

/// Design strength from a characteristic strength and a partial safety factor
///
/// # Formula
/// fd = fk / γm
#[inline]
pub fn design_strength(characteristic: f64, gamma: f64) -> f64 {
    characteristic / gamma
}

/// Effective depth to the centroid of a single layer of tension bars
///
/// # Formula
/// d = h − cover − Ø_stirrup − Ø_bar/2
///
/// # Example
/// ```rust
/// use civil_core::equations::flexure::effective_depth;
///
/// assert_eq!(effective_depth(500.0, 30.0, 10.0, 16.0), 452.0);
/// ```
#[inline]
pub fn effective_depth(h: f64, cover: f64, stirrup_diameter: f64, bar_diameter: f64) -> f64 {
    h - cover - stirrup_diameter - bar_diameter / 2.0
}

/// Depth of the equivalent compression block from horizontal equilibrium
///
/// # Formula
/// As·fyd = 0.85·fcd·b·a  →  a = As·fyd / (0.85·fcd·b)
#[inline]
pub fn stress_block_depth(as_mm2: f64, fyd: f64, fcd: f64, b: f64) -> f64 {
    as_mm2 * fyd / (STRESS_BLOCK_FACTOR * fcd * b)
}

/// Nominal moment capacity about the compression block centroid (N·mm)
///
/// # Formula
/// Mr = As·fyd·(d − a/2)
#[inline]
pub fn moment_capacity(as_mm2: f64, fyd: f64, d: f64, a: f64) -> f64 {
    as_mm2 * fyd * (d - a / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_design_strengths() {
        assert_relative_eq!(design_strength(25.0, GAMMA_CONCRETE), 16.6667, epsilon = 1e-4);
        assert_relative_eq!(design_strength(420.0, GAMMA_STEEL), 365.2174, epsilon = 1e-4);
    }

    #[test]
    fn test_stress_block_depth() {
        // 3Ø16, B420C, C25/30, b = 300
        let a = stress_block_depth(603.186, 365.217, 16.6667, 300.0);
        assert_relative_eq!(a, 51.83, epsilon = 0.01);
    }

    #[test]
    fn test_moment_capacity_increases_with_depth() {
        let shallow = moment_capacity(603.0, 365.0, 400.0, 50.0);
        let deep = moment_capacity(603.0, 365.0, 450.0, 50.0);
        assert!(deep > shallow);
    }
}
