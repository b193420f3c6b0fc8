//! # Unit Types
//!
//! Type-safe wrappers for moments, the one quantity section design reports
//! in two units: formulas work in N·mm, inputs and results are given in kN·m.
//! Lengths and stresses stay plain `f64` in mm and MPa (N/mm²).
//!
//! ## Example
//!
//! ```rust
//! use civil_core::units::{KnM, NMm};
//!
//! let mr = NMm(94_100_000.0);
//! let mr_knm: KnM = mr.into();
//! assert!((mr_knm.value() - 94.1).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// Moment in newton-millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NMm(pub f64);

/// Moment in kilonewton-meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnM(pub f64);

impl NMm {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl KnM {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<NMm> for KnM {
    fn from(m: NMm) -> Self {
        KnM(m.0 / 1e6)
    }
}

impl From<KnM> for NMm {
    fn from(m: KnM) -> Self {
        NMm(m.0 * 1e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knm_to_nmm() {
        let m = KnM(80.0);
        let nmm: NMm = m.into();
        assert_eq!(nmm.value(), 80_000_000.0);
    }

    #[test]
    fn test_nmm_to_knm() {
        let m = NMm(1_500_000.0);
        let knm: KnM = m.into();
        assert_eq!(knm.value(), 1.5);
    }

    #[test]
    fn test_moments_compare_in_same_unit() {
        let mr: KnM = NMm(93_863_517.0).into();
        assert!(mr >= KnM(80.0));
        assert!(mr < KnM(100.0));
    }

    #[test]
    fn test_serialization() {
        let md = KnM(80.0);
        let json = serde_json::to_string(&md).unwrap();
        assert_eq!(json, "80.0");

        let roundtrip: KnM = serde_json::from_str(&json).unwrap();
        assert_eq!(md, roundtrip);
    }
}
