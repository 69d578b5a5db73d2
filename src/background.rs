//! Backdrop selection: transparent or a solid color.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::{Error, Result};

/// A named entry in the fixed background palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    /// Identifier used to select the swatch.
    pub id: &'static str,
    /// The backdrop this swatch selects.
    pub choice: BackgroundChoice,
}

/// The fixed palette offered next to the preview, "transparent" first.
pub const SWATCHES: &[Swatch] = &[
    Swatch {
        id: "transparent",
        choice: BackgroundChoice::Transparent,
    },
    Swatch {
        id: "white",
        choice: BackgroundChoice::Color([255, 255, 255]),
    },
    Swatch {
        id: "black",
        choice: BackgroundChoice::Color([0, 0, 0]),
    },
    Swatch {
        id: "studio-gray",
        choice: BackgroundChoice::Color([45, 45, 45]),
    },
    Swatch {
        id: "red",
        choice: BackgroundChoice::Color([255, 0, 0]),
    },
    Swatch {
        id: "green",
        choice: BackgroundChoice::Color([16, 185, 129]),
    },
    Swatch {
        id: "blue",
        choice: BackgroundChoice::Color([59, 130, 246]),
    },
    Swatch {
        id: "amber",
        choice: BackgroundChoice::Color([251, 191, 36]),
    },
];

/// What the exported image is flattened against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackgroundChoice {
    /// No fill; alpha survives into the export.
    #[default]
    Transparent,
    /// An opaque RGB fill.
    Color([u8; 3]),
}

impl BackgroundChoice {
    /// Look up a palette swatch by identifier (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBackground`] if no swatch has that identifier.
    pub fn from_swatch(id: &str) -> Result<Self> {
        SWATCHES
            .iter()
            .find(|s| s.id.eq_ignore_ascii_case(id))
            .map(|s| s.choice)
            .ok_or_else(|| Error::InvalidBackground(format!("unknown swatch '{id}'")))
    }

    /// The fill as an opaque RGBA pixel, or `None` for transparent.
    #[must_use]
    pub fn fill(&self) -> Option<Rgba<u8>> {
        match *self {
            Self::Transparent => None,
            Self::Color([r, g, b]) => Some(Rgba([r, g, b, 255])),
        }
    }

    /// Whether compositing against this choice yields a fully opaque image.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Color(_))
    }
}

impl fmt::Display for BackgroundChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => f.write_str("transparent"),
            Self::Color([r, g, b]) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl FromStr for BackgroundChoice {
    type Err = Error;

    /// Accepts `transparent`, `none`, `#rrggbb`, `#rgb`, or a swatch id.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::Transparent);
        }
        match s.strip_prefix('#') {
            Some(hex) => parse_hex(hex)
                .map(Self::Color)
                .ok_or_else(|| Error::InvalidBackground(s.to_string())),
            None => Self::from_swatch(s),
        }
    }
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        3 => {
            let mut rgb = [0u8; 3];
            for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                let v = u8::try_from(digit.to_digit(16)?).ok()?;
                *slot = v * 17;
            }
            Some(rgb)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            "#ff0000".parse::<BackgroundChoice>().unwrap(),
            BackgroundChoice::Color([255, 0, 0])
        );
        assert_eq!(
            "#0F8".parse::<BackgroundChoice>().unwrap(),
            BackgroundChoice::Color([0, 255, 136])
        );
    }

    #[test]
    fn parses_transparent_aliases() {
        for s in ["transparent", "Transparent", "none", " none "] {
            assert_eq!(
                s.parse::<BackgroundChoice>().unwrap(),
                BackgroundChoice::Transparent
            );
        }
    }

    #[test]
    fn rejects_malformed_values() {
        for s in ["#ff00", "#gggggg", "mauve", "", "#"] {
            assert!(
                matches!(s.parse::<BackgroundChoice>(), Err(Error::InvalidBackground(_))),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn swatch_lookup_is_case_insensitive() {
        assert_eq!(
            BackgroundChoice::from_swatch("RED").unwrap(),
            BackgroundChoice::Color([255, 0, 0])
        );
        assert_eq!(
            BackgroundChoice::from_swatch("Studio-Gray").unwrap(),
            BackgroundChoice::Color([45, 45, 45])
        );
        assert!(BackgroundChoice::from_swatch("plaid").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for swatch in SWATCHES {
            let text = swatch.choice.to_string();
            assert_eq!(text.parse::<BackgroundChoice>().unwrap(), swatch.choice);
        }
    }

    #[test]
    fn fill_is_opaque_for_colors_only() {
        assert_eq!(BackgroundChoice::Transparent.fill(), None);
        assert!(!BackgroundChoice::Transparent.is_opaque());
        assert_eq!(
            BackgroundChoice::Color([1, 2, 3]).fill(),
            Some(Rgba([1, 2, 3, 255]))
        );
    }
}
