//! Direction sampling along a measured polyline.

use crate::measure::MeasuredPolyline;
use crate::vector::Vector;

/// Unit direction of the segment containing `normalized_position`
/// (0 = first vertex, 1 = last vertex).
///
/// Walks the segment lengths until the running sum reaches the target
/// distance. Positions past the end (or floating error at the very end)
/// saturate to the final segment's direction. Zero-length segments have
/// no direction and are stepped over; the fallback is the last segment
/// that has one.
///
/// Returns `None` when no segment has a usable direction (single vertex,
/// all vertices coincident, or non-finite coordinates).
#[must_use]
pub fn direction_at(measured: &MeasuredPolyline, normalized_position: f64) -> Option<Vector> {
    let target = measured.total_length() * normalized_position;
    let mut walked = 0.0;
    let mut last_direction = None;

    for segment in measured.segments() {
        walked += segment.length;
        let Some(direction) = segment.direction() else {
            continue;
        };
        if walked >= target {
            return Some(direction);
        }
        last_direction = Some(direction);
    }

    last_direction
}
