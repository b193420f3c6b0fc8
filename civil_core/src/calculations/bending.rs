//! # Bending Capacity Check
//!
//! Moment capacity of a singly reinforced rectangular concrete section per
//! TS 500 (simplified), compared against a design moment.
//!
//! ## Assumptions
//!
//! - Tension reinforcement only, one layer
//! - Steel yields (the neutral-axis check only warns)
//! - Equivalent rectangular stress block, k1 = 0.85 (fck ≤ 50 MPa)
//!
//! ## Example
//!
//! ```rust
//! use civil_core::calculations::bending::{calculate, BendingInput, CapacityStatus, RebarLayout};
//!
//! let input = BendingInput {
//!     label: "K1".to_string(),
//!     b_mm: 300.0,
//!     h_mm: 500.0,
//!     cover_mm: 30.0,
//!     stirrup_diameter_mm: 10.0,
//!     bars: RebarLayout::new(3, 16.0),
//!     fck_mpa: 25.0,
//!     fyk_mpa: 420.0,
//!     es_mpa: 200_000.0,
//!     md_knm: 80.0,
//!     concrete_name: "C25/30".to_string(),
//!     rebar_name: "B420C".to_string(),
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.status, CapacityStatus::Sufficient);
//! assert!((result.mr_knm - 93.86).abs() < 0.01);
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::equations::flexure::{
    design_strength, effective_depth, moment_capacity, stress_block_depth, GAMMA_CONCRETE,
    GAMMA_STEEL, K1,
};
use crate::errors::{CoreError, CoreResult, EntityKind};
use crate::profile::Profile;
use crate::sections::SectionGeometry;
use crate::units::{KnM, NMm};

/// Tension bars: `count` bars of one diameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarLayout {
    pub count: u32,
    pub diameter_mm: f64,
}

impl RebarLayout {
    pub fn new(count: u32, diameter_mm: f64) -> Self {
        RebarLayout { count, diameter_mm }
    }

    /// Total steel area As = n·π·(Ø/2)² (mm²)
    pub fn area_mm2(&self) -> f64 {
        self.count as f64 * PI * (self.diameter_mm / 2.0).powi(2)
    }
}

impl std::fmt::Display for RebarLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Ø{}", self.count, self.diameter_mm)
    }
}

/// Input parameters for the bending check.
///
/// Build it by hand, or from a profile with [`BendingInput::from_profile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendingInput {
    /// Section name, for the report
    pub label: String,

    /// Section width (mm)
    pub b_mm: f64,

    /// Section height (mm)
    pub h_mm: f64,

    /// Clear cover (mm)
    pub cover_mm: f64,

    /// Stirrup diameter (mm)
    pub stirrup_diameter_mm: f64,

    /// Tension reinforcement
    pub bars: RebarLayout,

    /// Concrete characteristic strength (MPa)
    pub fck_mpa: f64,

    /// Steel characteristic yield strength (MPa)
    pub fyk_mpa: f64,

    /// Steel modulus of elasticity (MPa), reported only
    pub es_mpa: f64,

    /// Design moment Md (kN·m)
    pub md_knm: f64,

    pub concrete_name: String,
    pub rebar_name: String,
}

impl BendingInput {
    /// Gather inputs from a profile.
    ///
    /// The section must be rectangular and reference a concrete material;
    /// `rebar_material` must name a reinforcing steel. The section's own
    /// cover is used.
    ///
    /// # Errors
    ///
    /// - `NotFound` for a missing section or rebar material
    /// - `InvalidGeometry` for a circular section
    /// - `UnresolvedMaterial` when the section's concrete is gone or the rebar
    ///   name points at a concrete
    pub fn from_profile(
        profile: &Profile,
        section_name: &str,
        rebar_material: &str,
        bars: RebarLayout,
        stirrup_diameter_mm: f64,
        md_knm: f64,
    ) -> CoreResult<Self> {
        let section = profile
            .sections
            .get(section_name)
            .ok_or_else(|| CoreError::not_found(EntityKind::Section, section_name))?;

        let (b_mm, h_mm) = match section.geometry {
            SectionGeometry::Rectangular { b, h } => (b, h),
            SectionGeometry::Circular { d } => {
                return Err(CoreError::invalid_geometry(
                    "D",
                    d,
                    format!("Section '{}' is not rectangular", section.user_name),
                ))
            }
        };

        let concrete = profile
            .materials
            .resolve_concrete(&section.material_name)
            .ok_or_else(|| {
                CoreError::unresolved_material(&section.user_name, &section.material_name)
            })?;
        let fck_mpa = concrete
            .fck()
            .ok_or_else(|| CoreError::unresolved_material(&section.user_name, &concrete.user_name))?;

        let rebar = profile
            .materials
            .get(rebar_material)
            .ok_or_else(|| CoreError::not_found(EntityKind::Material, rebar_material))?;
        let (fyk_mpa, es_mpa) = match (rebar.fyk(), rebar.es()) {
            (Some(fyk), Some(es)) => (fyk, es),
            _ => {
                return Err(CoreError::unresolved_material(
                    &section.user_name,
                    rebar_material,
                ))
            }
        };

        Ok(BendingInput {
            label: section.user_name.clone(),
            b_mm,
            h_mm,
            cover_mm: section.cover_mm,
            stirrup_diameter_mm,
            bars,
            fck_mpa,
            fyk_mpa,
            es_mpa,
            md_knm,
            concrete_name: concrete.user_name.clone(),
            rebar_name: rebar.user_name.clone(),
        })
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("b_mm", self.b_mm),
            ("h_mm", self.h_mm),
            ("bar_diameter_mm", self.bars.diameter_mm),
            ("fck_mpa", self.fck_mpa),
            ("fyk_mpa", self.fyk_mpa),
            ("es_mpa", self.es_mpa),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::invalid_input(
                    field,
                    value.to_string(),
                    "Must be positive",
                ));
            }
        }

        if self.bars.count == 0 {
            return Err(CoreError::invalid_input(
                "bar_count",
                "0",
                "At least one bar is required",
            ));
        }

        let non_negative = [
            ("cover_mm", self.cover_mm),
            ("stirrup_diameter_mm", self.stirrup_diameter_mm),
            ("md_knm", self.md_knm),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CoreError::invalid_input(
                    field,
                    value.to_string(),
                    "Cannot be negative",
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of the capacity comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityStatus {
    /// Mr ≥ Md
    Sufficient,
    /// Mr < Md
    Insufficient,
}

impl std::fmt::Display for CapacityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityStatus::Sufficient => write!(f, "SUFFICIENT"),
            CapacityStatus::Insufficient => write!(f, "INSUFFICIENT"),
        }
    }
}

/// Results of the bending check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendingResult {
    /// Inputs as used
    pub input: BendingInput,

    /// Design concrete strength fcd = fck/γmc (MPa)
    pub fcd_mpa: f64,

    /// Design yield strength fyd = fyk/γms (MPa)
    pub fyd_mpa: f64,

    /// Effective depth d (mm)
    pub d_mm: f64,

    /// Tension steel area As (mm²)
    pub as_mm2: f64,

    /// Stress block depth a (mm)
    pub a_mm: f64,

    /// Neutral axis depth c = a/k1 (mm)
    pub c_mm: f64,

    /// Moment capacity (N·mm)
    pub mr_nmm: f64,

    /// Moment capacity (kN·m)
    pub mr_knm: f64,

    /// Mr/Md, `None` when Md is zero
    pub ratio: Option<f64>,

    pub status: CapacityStatus,

    /// Non-fatal findings (e.g. neutral axis below d)
    pub warnings: Vec<String>,
}

impl BendingResult {
    pub fn passes(&self) -> bool {
        self.status == CapacityStatus::Sufficient
    }

    /// Plain-text report: inputs, calculation steps and result.
    pub fn report(&self) -> String {
        let i = &self.input;
        let mut out = String::new();

        out.push_str("--- INPUTS ---\n");
        out.push_str(&format!(
            "Section: {} (b = {:.0} mm, h = {:.0} mm)\n",
            i.label, i.b_mm, i.h_mm
        ));
        out.push_str(&format!(
            "Concrete: {} (fck = {:.1} MPa)\n",
            i.concrete_name, i.fck_mpa
        ));
        out.push_str(&format!(
            "Rebar: {} (fyk = {:.0} MPa, Es = {:.0} MPa)\n",
            i.rebar_name, i.fyk_mpa, i.es_mpa
        ));
        out.push_str(&format!(
            "Tension bars: {} x Ø{:.0} mm\n",
            i.bars.count, i.bars.diameter_mm
        ));
        out.push_str(&format!("Cover: {:.0} mm\n", i.cover_mm));
        out.push_str(&format!("Stirrup diameter: {:.0} mm\n", i.stirrup_diameter_mm));
        out.push_str(&format!("Design moment (Md): {:.2} kNm\n", i.md_knm));

        out.push_str("\n--- CALCULATION (TS 500, simplified) ---\n");
        out.push_str(&format!(
            "fcd = {:.1} / {} = {:.2} MPa\n",
            i.fck_mpa, GAMMA_CONCRETE, self.fcd_mpa
        ));
        out.push_str(&format!(
            "fyd = {:.0} / {} = {:.2} MPa\n",
            i.fyk_mpa, GAMMA_STEEL, self.fyd_mpa
        ));
        out.push_str(&format!("As = {:.2} mm²\n", self.as_mm2));
        out.push_str(&format!(
            "d = {:.0} - {:.0} - {:.0} - {:.1} = {:.2} mm\n",
            i.h_mm,
            i.cover_mm,
            i.stirrup_diameter_mm,
            i.bars.diameter_mm / 2.0,
            self.d_mm
        ));
        out.push_str(&format!(
            "a = ({:.2} * {:.2}) / (0.85 * {:.2} * {:.0}) = {:.2} mm\n",
            self.as_mm2, self.fyd_mpa, self.fcd_mpa, i.b_mm, self.a_mm
        ));
        out.push_str(&format!(
            "c = {:.2} / {:.2} = {:.2} mm\n",
            self.a_mm, K1, self.c_mm
        ));
        for warning in &self.warnings {
            out.push_str(&format!("WARNING: {}\n", warning));
        }
        out.push_str(&format!(
            "Mr = {:.2} * {:.2} * ({:.2} - {:.2})\n",
            self.as_mm2,
            self.fyd_mpa,
            self.d_mm,
            self.a_mm / 2.0
        ));
        out.push_str(&format!(
            "Mr = {:.2} Nmm = {:.2} kNm\n",
            self.mr_nmm, self.mr_knm
        ));

        out.push_str("\n--- RESULT ---\n");
        let comparison = match self.status {
            CapacityStatus::Sufficient => ">=",
            CapacityStatus::Insufficient => "<",
        };
        out.push_str(&format!(
            "CAPACITY: {} (Mr = {:.2} kNm {} Md = {:.2} kNm)\n",
            self.status, self.mr_knm, comparison, i.md_knm
        ));
        match self.ratio {
            Some(ratio) => out.push_str(&format!("Capacity ratio (Mr / Md): {:.3}\n", ratio)),
            None => out.push_str("Capacity ratio (Mr / Md): n/a (Md = 0)\n"),
        }
        out
    }
}

/// Calculate the moment capacity and compare it with Md.
///
/// # Returns
///
/// * `Ok(BendingResult)` - Calculation results, possibly with warnings
/// * `Err(CoreError::InvalidInput)` - Out-of-range input
/// * `Err(CoreError::InvalidGeometry)` - d ≤ 0, or a outside (0, h]
pub fn calculate(input: &BendingInput) -> CoreResult<BendingResult> {
    input.validate()?;

    let fcd = design_strength(input.fck_mpa, GAMMA_CONCRETE);
    let fyd = design_strength(input.fyk_mpa, GAMMA_STEEL);

    let d = effective_depth(
        input.h_mm,
        input.cover_mm,
        input.stirrup_diameter_mm,
        input.bars.diameter_mm,
    );
    if d <= 0.0 {
        return Err(CoreError::invalid_geometry(
            "d",
            d,
            "Effective depth must be positive",
        ));
    }

    let as_mm2 = input.bars.area_mm2();
    let a = stress_block_depth(as_mm2, fyd, fcd, input.b_mm);
    if a <= 0.0 || a > input.h_mm {
        return Err(CoreError::invalid_geometry(
            "a",
            a,
            "Compression block must lie within the section",
        ));
    }

    let c = a / K1;
    let mut warnings = Vec::new();
    if c > d {
        warnings.push(format!(
            "Neutral axis (c = {:.1} mm) is below the effective depth (d = {:.1} mm); result is questionable",
            c, d
        ));
    }

    let mr = NMm(moment_capacity(as_mm2, fyd, d, a));
    let mr_knm: KnM = mr.into();
    let md = KnM(input.md_knm);

    let status = if mr_knm >= md {
        CapacityStatus::Sufficient
    } else {
        CapacityStatus::Insufficient
    };
    let ratio = (md.value() != 0.0).then(|| mr_knm.value() / md.value());

    log::debug!(
        "Bending '{}': Mr = {:.2} kNm, Md = {:.2} kNm, {}",
        input.label,
        mr_knm.value(),
        md.value(),
        status
    );

    Ok(BendingResult {
        input: input.clone(),
        fcd_mpa: fcd,
        fyd_mpa: fyd,
        d_mm: d,
        as_mm2,
        a_mm: a,
        c_mm: c,
        mr_nmm: mr.value(),
        mr_knm: mr_knm.value(),
        ratio,
        status,
        warnings,
    })
}
