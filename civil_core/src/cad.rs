//! # CAD Bridge
//!
//! The capability set the application needs from an external drawing
//! program: connect, read and write system variables, draw primitives,
//! prompt on the command line and pick points.
//!
//! No implementation ships with `civil_core`; a front end provides one for
//! whatever CAD it automates. Profiles and calculations never depend on it.
//!
//! ## Example
//!
//! ```rust
//! use civil_core::cad::{draw_section, CadBridge, Point};
//!
//! fn draw_all(cad: &mut dyn CadBridge, profile: &civil_core::profile::Profile) {
//!     let mut x = 0.0;
//!     for section in profile.sections.iter() {
//!         draw_section(cad, section, Point::new(x, 0.0)).ok();
//!         x += 1000.0;
//!     }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::sections::{Section, SectionGeometry};

/// A 2D drawing coordinate (drawing units, mm for sections)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Value of a CAD system variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CadValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl CadValue {
    /// Convert `self` to the type of `current`.
    ///
    /// Bit-code variables such as OSMODE are integers; writing a real or text
    /// value to them must convert first.
    pub fn coerce_like(&self, current: &CadValue, name: &str) -> CoreResult<CadValue> {
        let fail = || {
            CoreError::cad(
                "set_variable",
                format!("{} cannot hold {}", name, self),
            )
        };
        Ok(match (current, self) {
            (CadValue::Int(_), CadValue::Int(v)) => CadValue::Int(*v),
            (CadValue::Int(_), CadValue::Real(v)) if v.fract() == 0.0 => CadValue::Int(*v as i64),
            (CadValue::Int(_), CadValue::Text(s)) => {
                CadValue::Int(s.trim().parse().map_err(|_| fail())?)
            }
            (CadValue::Real(_), CadValue::Int(v)) => CadValue::Real(*v as f64),
            (CadValue::Real(_), CadValue::Real(v)) => CadValue::Real(*v),
            (CadValue::Real(_), CadValue::Text(s)) => {
                CadValue::Real(s.trim().parse().map_err(|_| fail())?)
            }
            (CadValue::Text(_), other) => CadValue::Text(other.to_string()),
            _ => return Err(fail()),
        })
    }
}

impl fmt::Display for CadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CadValue::Int(v) => write!(f, "{}", v),
            CadValue::Real(v) => write!(f, "{}", v),
            CadValue::Text(s) => f.write_str(s),
        }
    }
}

/// Operations the application performs against a CAD program.
///
/// Failures are `CoreError::Cad`. Implementors provide the primitive
/// operations; variable access with defaults and type coercion comes with
/// the trait.
pub trait CadBridge {
    /// Attach to a running instance. Returns the active document's name.
    fn connect(&mut self) -> CoreResult<String>;

    fn is_connected(&self) -> bool;

    /// Raw variable read
    fn read_variable(&self, name: &str) -> CoreResult<CadValue>;

    /// Raw variable write, no type conversion
    fn write_variable(&mut self, name: &str, value: CadValue) -> CoreResult<()>;

    fn draw_line(&mut self, start: Point, end: Point) -> CoreResult<()>;

    fn draw_circle(&mut self, center: Point, radius: f64) -> CoreResult<()>;

    /// Lightweight polyline through `vertices`
    fn draw_polyline(&mut self, vertices: &[Point], closed: bool) -> CoreResult<()>;

    /// Show a message on the CAD command line
    fn prompt(&mut self, message: &str) -> CoreResult<()>;

    /// Ask the user to pick a point. `None` when cancelled or disconnected.
    fn get_point(&mut self, prompt: &str) -> Option<Point>;

    /// Read a variable, falling back to `default` on any failure.
    fn get_variable(&self, name: &str, default: CadValue) -> CadValue {
        match self.read_variable(name) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Could not read CAD variable '{}': {}", name, e);
                default
            }
        }
    }

    /// Write a variable, converting the value to the variable's current type.
    fn set_variable(&mut self, name: &str, value: CadValue) -> CoreResult<()> {
        let current = self.read_variable(name)?;
        let value = value.coerce_like(&current, name)?;
        log::info!("Setting CAD variable '{}' to {}", name, value);
        self.write_variable(name, value)
    }
}

/// Outline of a section centred on `origin`: a closed rectangle or a circle.
pub fn draw_section(cad: &mut dyn CadBridge, section: &Section, origin: Point) -> CoreResult<()> {
    if !cad.is_connected() {
        return Err(CoreError::cad("draw_section", "not connected"));
    }
    section.geometry.validate()?;

    match section.geometry {
        SectionGeometry::Rectangular { b, h } => {
            let (hb, hh) = (b / 2.0, h / 2.0);
            let corners = [
                origin.offset(-hb, -hh),
                origin.offset(hb, -hh),
                origin.offset(hb, hh),
                origin.offset(-hb, hh),
            ];
            cad.draw_polyline(&corners, true)?;
        }
        SectionGeometry::Circular { d } => cad.draw_circle(origin, d / 2.0)?,
    }
    log::info!("Drew section '{}' at {}", section.user_name, origin);
    Ok(())
}
