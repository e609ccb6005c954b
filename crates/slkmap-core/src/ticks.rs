//! Chainage tick generation.
//!
//! Lays tick marks along a measured polyline at absolute multiples of
//! the minor interval, so ticks stay put when the map is panned: a tick
//! at 10.3 km is at 10.3 km whichever part of the road is on screen.
//!
//! Chainage is assumed to vary linearly with pixel arc length along the
//! feature. That holds for straight or densely digitised roads and is
//! only approximate for sparse vertices on curves; it is not corrected.

use serde::{Deserialize, Serialize};

use crate::log;
use crate::measure::MeasuredPolyline;
use crate::policy::TickIntervals;
use crate::types::{AnnotateError, ChainageRange, Viewport};
use crate::vector::Vector;

/// Half-length of a minor tick mark, in pixels.
pub const MINOR_TICK_HALF_LENGTH_PX: f64 = 2.0;

/// Half-length of a major tick mark, in pixels.
pub const MAJOR_TICK_HALF_LENGTH_PX: f64 = 6.0;

/// Largest walk step count whose pixel offsets stay exact in `f64`.
pub const MAX_TICK_STEPS: u64 = 1 << 53;

/// Ticks closer than this to the pixel end of the line are not emitted,
/// so a tick landing exactly on the last vertex is excluded regardless
/// of floating-point noise in the offset.
const END_TOLERANCE_PX: f64 = 1e-6;

/// Relative tolerance for treating `slk_from` as an exact multiple of
/// the minor interval (`10.0 / 0.1` is not exactly 100 in binary).
const CHAINAGE_SNAP_TOLERANCE: f64 = 1e-9;

/// Slack around the visible part of a segment when skipping ahead, so a
/// tick sitting on the viewport edge is still tested.
const VISIBLE_SLACK_PX: f64 = 1e-6;

/// Whether a tick is an unlabelled minor mark or a labelled major mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickKind {
    /// Short unlabelled tick.
    Minor,
    /// Long labelled tick at a multiple of the major interval.
    Major,
}

impl TickKind {
    /// Half-length of the drawn mark, in pixels.
    #[must_use]
    pub const fn half_length_px(self) -> f64 {
        match self {
            Self::Minor => MINOR_TICK_HALF_LENGTH_PX,
            Self::Major => MAJOR_TICK_HALF_LENGTH_PX,
        }
    }
}

/// A single tick mark in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Endpoints of the short mark perpendicular to the road, clipped to
    /// the viewport.
    pub segment: (Vector, Vector),
    /// Chainage text; present on major ticks only.
    pub label: Option<String>,
    /// Angle of the road direction at the tick, in radians. Not adjusted
    /// for text readability.
    pub rotation: f64,
    /// Absolute chainage of the tick, in kilometres.
    pub chainage: f64,
    /// Major or minor.
    pub kind: TickKind,
    /// Pixel arc length from the first vertex to the tick.
    pub offset_px: f64,
}

/// Everything [`generate_ticks`] needs besides the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRequest {
    /// Chainage at the first and last vertex.
    pub chainage: ChainageRange,
    /// Tick spacing and label precision.
    pub intervals: TickIntervals,
    /// Visible pixel window; ticks outside it are dropped.
    pub viewport: Viewport,
}

/// Generate the visible tick marks along `measured`.
///
/// Ticks fall on every chainage `n * minor_interval_km` from
/// `chainage.from` (inclusive) up to the pixel end of the line
/// (exclusive), so features sharing an end chainage tick it exactly
/// once. A tick is emitted only if its base point lies inside the
/// viewport; its mark is then clipped to the viewport. Output is
/// ordered by distance along the line.
///
/// Work is proportional to the visible ticks, not the feature length:
/// the walk jumps over segments, and parts of segments, that lie outside
/// the viewport.
///
/// Degenerate inputs produce no ticks: a zero, negative or non-finite
/// chainage span, a polyline with zero length, or a single vertex.
/// Zero-length segments are stepped over.
///
/// # Errors
///
/// Returns [`AnnotateError::InvalidIntervals`] if the minor interval is
/// not a positive finite number or the major count is zero, and
/// [`AnnotateError::TooManyTicks`] if the line holds more than
/// [`MAX_TICK_STEPS`] tick positions.
pub fn generate_ticks(
    measured: &MeasuredPolyline,
    request: &TickRequest,
) -> Result<Vec<Tick>, AnnotateError> {
    let TickRequest {
        chainage,
        intervals,
        viewport,
    } = *request;
    let minor_km = intervals.minor_interval_km;
    if !(minor_km.is_finite() && minor_km > 0.0) {
        return Err(AnnotateError::InvalidIntervals(format!(
            "minor interval must be positive, got {minor_km}"
        )));
    }
    if intervals.major_interval_count == 0 {
        return Err(AnnotateError::InvalidIntervals(
            "major interval count must be at least 1".into(),
        ));
    }

    let length_px = measured.total_length();
    if chainage.is_degenerate() || !(length_px.is_finite() && length_px > 0.0) {
        log::debug!(?chainage, length_px, "degenerate feature, no ticks");
        return Ok(Vec::new());
    }

    let px_per_km = length_px / chainage.length_km();
    let minor_interval_px = minor_km * px_per_km;
    if !(minor_interval_px.is_finite() && minor_interval_px > 0.0) {
        return Ok(Vec::new());
    }
    if length_px / minor_interval_px > u64_to_f64(MAX_TICK_STEPS) {
        return Err(AnnotateError::TooManyTicks {
            limit: MAX_TICK_STEPS,
            minor_interval_px,
            length_px,
        });
    }

    let first_index = first_tick_index(chainage.from, minor_km);
    let initial_offset_px = (index_to_f64(first_index) * minor_km - chainage.from) * px_per_km;
    let major_count = i64::from(intervals.major_interval_count);
    // Steps until the first major tick; majors then repeat every `major_count`.
    let major_phase =
        ((major_count - first_index.rem_euclid(major_count)) % major_count).unsigned_abs();
    let major_count = major_count.unsigned_abs();
    let offset_at = |step: u64| u64_to_f64(step).mul_add(minor_interval_px, initial_offset_px);
    // First step whose offset is at or past `target_px`.
    let first_step_from = |target_px: f64| -> u64 {
        let estimate = ((target_px - initial_offset_px) / minor_interval_px)
            .floor()
            .max(0.0);
        let mut step = f64_to_u64(estimate);
        while offset_at(step) < target_px {
            step += 1;
        }
        step
    };

    let mut ticks = Vec::new();
    let mut step = 0_u64;
    let mut walked_px = 0.0;
    let end_limit_px = length_px - END_TOLERANCE_PX;

    for segment in measured.segments() {
        let segment_end_px = walked_px + segment.length;
        let direction = segment.direction();
        let visible = viewport.clip_segment(segment.start, segment.end);
        let (Some(direction), Some((enter, exit))) = (direction, visible) else {
            walked_px = segment_end_px;
            step = step.max(first_step_from(segment_end_px));
            continue;
        };
        let perpendicular = direction.left();
        let rotation = direction.angle();
        let visible_from_px = walked_px + segment.start.distance_to(enter) - VISIBLE_SLACK_PX;
        let visible_to_px = walked_px + segment.start.distance_to(exit) + VISIBLE_SLACK_PX;
        step = step.max(first_step_from(visible_from_px));

        let mut offset_px = offset_at(step);
        while offset_px < segment_end_px && offset_px < end_limit_px && offset_px <= visible_to_px
        {
            let kind = if step % major_count == major_phase {
                TickKind::Major
            } else {
                TickKind::Minor
            };
            let base = segment.start + direction * (offset_px - walked_px);

            if viewport.contains(base) {
                let half = perpendicular * kind.half_length_px();
                if let Some(mark) = viewport.clip_segment(base - half, base + half) {
                    let tick_chainage = (index_to_f64(first_index) + u64_to_f64(step)) * minor_km;
                    ticks.push(Tick {
                        segment: mark,
                        label: (kind == TickKind::Major).then(|| {
                            format!("{:.*}", intervals.decimal_figures, tick_chainage)
                        }),
                        rotation,
                        chainage: tick_chainage,
                        kind,
                        offset_px,
                    });
                }
            }
            step += 1;
            offset_px = offset_at(step);
        }

        walked_px = segment_end_px;
        step = step.max(first_step_from(segment_end_px));
    }

    log::debug!(
        emitted = ticks.len(),
        last_step = step,
        minor_interval_px,
        "generated ticks"
    );
    Ok(ticks)
}

/// Index `n` of the first chainage multiple `n * minor_km` at or after
/// `from`.
#[allow(clippy::cast_possible_truncation)]
fn first_tick_index(from: f64, minor_km: f64) -> i64 {
    let quotient = from / minor_km;
    let nearest = quotient.round();
    let base = if (quotient - nearest).abs() <= CHAINAGE_SNAP_TOLERANCE * nearest.abs().max(1.0) {
        nearest
    } else {
        quotient.ceil()
    };
    base as i64
}

#[allow(clippy::cast_precision_loss)]
const fn index_to_f64(index: i64) -> f64 {
    index as f64
}

#[allow(clippy::cast_precision_loss)]
const fn u64_to_f64(value: u64) -> f64 {
    value as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn f64_to_u64(value: f64) -> u64 {
    value as u64
}
