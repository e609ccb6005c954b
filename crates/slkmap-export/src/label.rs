//! Upright text placement for tick labels and road names.
//!
//! A label drawn along a tick would read upside down on roads heading
//! left. Rotations past a quarter turn are flipped by half a turn and the
//! text is anchored at its end instead, so it still grows away from the
//! road.

use std::f64::consts::{FRAC_PI_2, PI};

use slkmap_core::{Tick, Vector};

/// Which end of the text sits on the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// Text starts at the anchor (left-aligned when unrotated).
    Start,
    /// Text ends at the anchor (right-aligned when unrotated).
    End,
    /// Text is centred on the anchor.
    Middle,
}

impl TextAlign {
    /// Value of the SVG `text-anchor` attribute.
    #[must_use]
    pub const fn svg_anchor(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Middle => "middle",
        }
    }
}

/// Where and how to draw one piece of label text.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    /// Text to draw.
    pub text: String,
    /// Anchor point in pixels.
    pub anchor: Vector,
    /// Clockwise rotation of the baseline, in radians (y axis down).
    pub rotation: f64,
    /// Which end of the text is at `anchor`.
    pub align: TextAlign,
}

impl LabelPlacement {
    /// Rotation in degrees, as SVG `rotate()` expects.
    #[must_use]
    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.to_degrees()
    }
}

/// Keep text readable: rotations beyond a quarter turn either way are
/// turned half a turn and anchored at the text end.
#[must_use]
pub fn upright(rotation: f64) -> (f64, TextAlign) {
    if rotation.abs() > FRAC_PI_2 {
        (rotation + PI, TextAlign::End)
    } else {
        (rotation, TextAlign::Start)
    }
}

/// Placement for a tick's label, or `None` for unlabelled ticks.
///
/// The text runs along the tick (a quarter turn from the road direction)
/// starting from the tick's outer end.
#[must_use]
pub fn place_label(tick: &Tick) -> Option<LabelPlacement> {
    let text = tick.label.clone()?;
    let (rotation, align) = upright(tick.rotation + FRAC_PI_2);
    Some(LabelPlacement {
        text,
        anchor: tick.segment.1,
        rotation,
        align,
    })
}

/// Placement for a road-name label centred on the line at `anchor`,
/// following the road direction `direction`.
#[must_use]
pub fn place_road_label(text: String, anchor: Vector, direction: Vector) -> LabelPlacement {
    let (rotation, _) = upright(direction.angle());
    LabelPlacement {
        text,
        anchor,
        rotation,
        align: TextAlign::Middle,
    }
}
