//! Application settings persisted in `settings.json`.
//!
//! ```json
//! {
//!     "theme": "system",
//!     "window_geometry": "1100x700+100+50",
//!     "last_profile": "Default Profile"
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_WINDOW_GEOMETRY: &str = "1100x700+100+50";

/// Colour theme preference. Palettes belong to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::invalid_input("theme", s, "expected dark, light or system"))
    }
}

/// Window size and position, stored as `"<W>x<H>+<X>+<Y>"`.
///
/// Offsets may be negative (`"800x600+-20+10"` or `"800x600-20+10"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        WindowGeometry {
            width: 1100,
            height: 700,
            x: 100,
            y: 50,
        }
    }
}

impl fmt::Display for WindowGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

fn parse_offset(s: &str) -> Option<i32> {
    s.strip_prefix('+').unwrap_or(s).parse().ok()
}

impl FromStr for WindowGeometry {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::invalid_input("window_geometry", s, "expected WxH+X+Y");

        let (width, rest) = s.trim().split_once('x').ok_or_else(invalid)?;
        let offsets_at = rest.find(['+', '-']).ok_or_else(invalid)?;
        let (height, offsets) = rest.split_at(offsets_at);

        // The y offset starts at the first sign that follows a digit
        let bytes = offsets.as_bytes();
        let y_at = (1..bytes.len())
            .find(|&i| matches!(bytes[i], b'+' | b'-') && bytes[i - 1].is_ascii_digit())
            .ok_or_else(invalid)?;
        let (x, y) = offsets.split_at(y_at);

        let width: u32 = width.parse().map_err(|_| invalid())?;
        let height: u32 = height.parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        Ok(WindowGeometry {
            width,
            height,
            x: parse_offset(x).ok_or_else(invalid)?,
            y: parse_offset(y).ok_or_else(invalid)?,
        })
    }
}

impl TryFrom<String> for WindowGeometry {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<WindowGeometry> for String {
    fn from(geometry: WindowGeometry) -> Self {
        geometry.to_string()
    }
}

/// Contents of `settings.json`. Missing keys load as defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme: Theme,
    pub window_geometry: WindowGeometry,
    /// Profile that was active when the application last saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_profile: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.window_geometry.to_string(), DEFAULT_WINDOW_GEOMETRY);
        assert!(settings.last_profile.is_none());
    }

    #[test]
    fn test_geometry_parse() {
        let g: WindowGeometry = "1200x800+10+20".parse().unwrap();
        assert_eq!(
            g,
            WindowGeometry {
                width: 1200,
                height: 800,
                x: 10,
                y: 20
            }
        );

        let g: WindowGeometry = "800x600+-20-15".parse().unwrap();
        assert_eq!((g.x, g.y), (-20, -15));

        let g: WindowGeometry = "800x600-20+15".parse().unwrap();
        assert_eq!((g.x, g.y), (-20, 15));
        assert_eq!(g.to_string(), "800x600+-20+15");
    }

    #[test]
    fn test_geometry_rejects_garbage() {
        for bad in ["", "1100x700", "wide", "0x700+1+1", "1100x700+a+1", "x700+1+1"] {
            let err = bad.parse::<WindowGeometry>().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT", "{}", bad);
        }
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("neon".parse::<Theme>().is_err());
    }

    #[test]
    fn test_settings_json_layout() {
        let settings = AppSettings {
            theme: Theme::Dark,
            window_geometry: "1000x650+0+0".parse().unwrap(),
            last_profile: Some("Köprü".to_string()),
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["window_geometry"], "1000x650+0+0");
        assert_eq!(json["last_profile"], "Köprü");

        let back: AppSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_partial_settings_load() {
        let settings: AppSettings = serde_json::from_str(r#"{"theme": "light"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.window_geometry, WindowGeometry::default());

        assert!(serde_json::from_str::<AppSettings>(r#"{"window_geometry": "big"}"#).is_err());
    }
}
