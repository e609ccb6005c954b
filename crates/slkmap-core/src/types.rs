//! Shared types for the slkmap annotation engine.

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

/// The visible pixel window of the map canvas.
///
/// Coordinates are CSS pixels with the origin at the top-left corner,
/// the same space the host projects feature vertices into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if `point` lies within `[0, width] x [0, height]`.
    ///
    /// Both edges are inclusive. Non-finite points are never contained.
    #[must_use]
    pub fn contains(&self, point: Vector) -> bool {
        point.is_finite()
            && (0.0..=self.width).contains(&point.x)
            && (0.0..=self.height).contains(&point.y)
    }

    /// Clip the segment `a`-`b` to the viewport (Liang-Barsky).
    ///
    /// Returns `None` if no part of the segment is inside, or if either
    /// endpoint is not finite.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn clip_segment(&self, a: Vector, b: Vector) -> Option<(Vector, Vector)> {
        if !(a.is_finite() && b.is_finite()) {
            return None;
        }
        let delta = b - a;
        let mut t_enter: f64 = 0.0;
        let mut t_exit: f64 = 1.0;
        let edges = [
            (-delta.x, a.x),
            (delta.x, self.width - a.x),
            (-delta.y, a.y),
            (delta.y, self.height - a.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                // Parallel to this edge: entirely outside or irrelevant.
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t_enter = t_enter.max(r);
            } else {
                t_exit = t_exit.min(r);
            }
            if t_enter > t_exit {
                return None;
            }
        }
        Some((a.lerp(b, t_enter), a.lerp(b, t_exit)))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1024.0, 768.0)
    }
}

/// Real-world linear position (straight-line kilometres) at the first
/// and last vertex of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainageRange {
    /// Chainage at the first vertex, in kilometres.
    pub from: f64,
    /// Chainage at the last vertex, in kilometres.
    pub to: f64,
}

impl ChainageRange {
    /// Create a new chainage range.
    #[must_use]
    pub const fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Span of the range in kilometres (`to - from`).
    #[must_use]
    pub fn length_km(&self) -> f64 {
        self.to - self.from
    }

    /// Returns `true` if no ticks can be laid along this range: the span
    /// is zero, negative, or not finite.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let length = self.length_km();
        !(length.is_finite() && length > 0.0)
    }
}

/// Errors that can occur while annotating a feature.
///
/// Every variant is local to one feature: frame-level callers record the
/// error and carry on with the remaining features.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum AnnotateError {
    /// The feature geometry has no vertices at all.
    #[error("polyline has no vertices")]
    EmptyPolyline,

    /// Tick interval parameters are unusable.
    #[error("invalid tick intervals: {0}")]
    InvalidIntervals(String),

    /// The line holds more tick positions than can be stepped exactly.
    #[error(
        "tick walk exceeds {limit} steps ({minor_interval_px} px interval over {length_px} px)"
    )]
    TooManyTicks {
        /// The step limit that was exceeded.
        limit: u64,
        /// Pixel spacing between minor ticks.
        minor_interval_px: f64,
        /// Total pixel length of the polyline.
        length_px: f64,
    },

    /// The feature's network classification is not one of the known types.
    #[error("unknown network type {0:?}")]
    UnknownNetworkType(String),

    /// A colour string could not be parsed.
    #[error("invalid colour {0:?}")]
    InvalidColor(String),
}
