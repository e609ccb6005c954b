//! Road style resolution.
//!
//! Styles are computed per redraw from the classification and the current
//! settings. Nothing here is shared or mutated between redraws.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::network::NetworkType;
use crate::settings::RoadSettings;
use crate::types::AnnotateError;

/// An sRGB colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity, `0.0` (transparent) to `1.0` (opaque).
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque colour from channel values.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Opacity as an 8-bit channel value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl FromStr for Color {
    type Err = AnnotateError;

    /// Parse `#rrggbb`, `#rgb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
    ///
    /// `rgba` alpha accepts either a fraction (`0.5`) or a byte value
    /// above 1 (`255`), matching what host colour pickers emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnnotateError::InvalidColor(s.to_owned());
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let (args, has_alpha) = if let Some(rest) = trimmed.strip_prefix("rgba(") {
            (rest.strip_suffix(')').ok_or_else(invalid)?, true)
        } else if let Some(rest) = trimmed.strip_prefix("rgb(") {
            (rest.strip_suffix(')').ok_or_else(invalid)?, false)
        } else {
            return Err(invalid());
        };

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        // `rgba(...)` sometimes carries only three channels; accept it.
        let (channels, alpha) = match (parts.as_slice(), has_alpha) {
            ([r, g, b], _) => ([*r, *g, *b], None),
            ([r, g, b, a], true) => ([*r, *g, *b], Some(*a)),
            _ => return Err(invalid()),
        };

        let mut rgb = [0_u8; 3];
        for (slot, channel) in rgb.iter_mut().zip(channels) {
            *slot = channel.parse().map_err(|_| invalid())?;
        }
        let a = match alpha {
            None => 1.0,
            Some(text) => {
                let value: f64 = text.parse().map_err(|_| invalid())?;
                if !value.is_finite() || value < 0.0 {
                    return Err(invalid());
                }
                if value > 1.0 { value / 255.0 } else { value }
            }
        };

        Ok(Self {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: a.min(1.0),
        })
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    let nibble = |i: usize| {
        u8::from_str_radix(hex.get(i..=i)?, 16)
            .ok()
            .map(|v| v * 17)
    };
    match hex.len() {
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        _ => None,
    }
}

impl fmt::Display for Color {
    /// `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Stroke style for drawing a road line and its tick marks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadStyle {
    /// Stroke colour.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f64,
    /// Dash pattern as `[dash, gap]` pixels; `None` for a solid line.
    pub dash: Option<[f64; 2]>,
}

/// Resolve the stroke style of a classification under `settings`.
///
/// # Errors
///
/// Returns [`AnnotateError::InvalidColor`] if the colour in `settings`
/// that applies to `network` cannot be parsed.
pub fn resolve_style(
    network: NetworkType,
    settings: &RoadSettings,
) -> Result<RoadStyle, AnnotateError> {
    let (color, width, dash) = match network {
        NetworkType::MainRoadsControlledPath => (&settings.psp_road_color, 1.5, None),
        NetworkType::StateRoad => (&settings.state_road_color, 1.5, None),
        NetworkType::ProposedRoad => (&settings.state_road_color, 1.3, Some([10.0, 10.0])),
        NetworkType::LocalRoad | NetworkType::MiscellaneousRoad | NetworkType::Crossover => {
            (&settings.local_road_color, 1.0, None)
        }
    };
    Ok(RoadStyle {
        color: color.parse()?,
        width,
        dash,
    })
}
