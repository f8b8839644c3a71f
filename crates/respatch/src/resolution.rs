//! Target resolutions and the named presets offered by the front end.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{Error, Result};

/// Target output resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Preset::default().resolution()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = Error;

    /// Accepts a preset name (`1440p`, `4k`, ...) or `WIDTHxHEIGHT`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(preset) = s.parse::<Preset>() {
            return Ok(preset.resolution());
        }

        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::InvalidResolution(format!("expected WIDTHxHEIGHT, got '{}'", s)))?;

        let width = parse_dimension(w)?;
        let height = parse_dimension(h)?;
        Ok(Self { width, height })
    }
}

fn parse_dimension(s: &str) -> Result<u32> {
    let value = s
        .trim()
        .parse::<u32>()
        .map_err(|e| Error::InvalidResolution(format!("'{}': {}", s, e)))?;
    if value == 0 {
        return Err(Error::InvalidResolution("dimensions must be non-zero".to_string()));
    }
    Ok(value)
}

/// Resolution presets.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum Preset {
    #[strum(to_string = "1080p", serialize = "fhd")]
    Fhd,
    #[default]
    #[strum(to_string = "1440p", serialize = "qhd")]
    Qhd,
    #[strum(to_string = "4k", serialize = "2160p", serialize = "uhd")]
    Uhd,
}

impl Preset {
    pub fn resolution(&self) -> Resolution {
        match self {
            Self::Fhd => Resolution::new(1920, 1080),
            Self::Qhd => Resolution::new(2560, 1440),
            Self::Uhd => Resolution::new(3840, 2160),
        }
    }

    /// Human readable label, e.g. `1440p (2560x1440)`
    pub fn label(&self) -> String {
        format!("{} ({})", self, self.resolution())
    }

    pub fn all() -> impl Iterator<Item = Preset> {
        Self::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        assert_eq!("1080p".parse::<Resolution>().unwrap(), Resolution::new(1920, 1080));
        assert_eq!("1440p".parse::<Resolution>().unwrap(), Resolution::new(2560, 1440));
        assert_eq!("4K".parse::<Resolution>().unwrap(), Resolution::new(3840, 2160));
        assert_eq!("2160p".parse::<Resolution>().unwrap(), Resolution::new(3840, 2160));
    }

    #[test]
    fn test_parse_explicit_dimensions() {
        assert_eq!("3440x1440".parse::<Resolution>().unwrap(), Resolution::new(3440, 1440));
        assert_eq!(" 1600X900 ".parse::<Resolution>().unwrap(), Resolution::new(1600, 900));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Resolution>().is_err());
        assert!("1920".parse::<Resolution>().is_err());
        assert!("0x1080".parse::<Resolution>().is_err());
        assert!("axb".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_default_is_1440p() {
        assert_eq!(Resolution::default(), Resolution::new(2560, 1440));
        assert_eq!(Resolution::default().to_string(), "2560x1440");
    }

    #[test]
    fn test_preset_labels() {
        let labels: Vec<String> = Preset::all().map(|p| p.label()).collect();
        assert_eq!(
            labels,
            vec!["1080p (1920x1080)", "1440p (2560x1440)", "4k (3840x2160)"]
        );
    }
}
