//! Polyline measurement.
//!
//! Pairs every vertex with the pixel distance to the next vertex so that
//! downstream lookups (direction sampling, tick placement) never recompute
//! segment lengths. A measured polyline is built fresh for every feature
//! on every redraw and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::types::AnnotateError;
use crate::vector::Vector;

/// A vertex and the distance from it to the next vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredPoint {
    /// The vertex position.
    pub point: Vector,
    /// Distance to the next vertex; `0.0` for the last vertex.
    pub length_to_next: f64,
}

/// One straight piece of a measured polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start vertex.
    pub start: Vector,
    /// End vertex.
    pub end: Vector,
    /// Distance from `start` to `end`.
    pub length: f64,
}

impl Segment {
    /// Unit direction from `start` to `end`, or `None` for a zero-length
    /// (or non-finite) segment.
    #[must_use]
    pub fn direction(&self) -> Option<Vector> {
        if self.length > 0.0 && self.length.is_finite() {
            Some((self.end - self.start).scale_divide(self.length))
        } else {
            None
        }
    }
}

/// A polyline with per-segment lengths and the total arc length.
///
/// Invariants: at least one point; the last point's `length_to_next`
/// is `0.0`; `total_length` is the sum of all other `length_to_next`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredPolyline {
    points: Vec<MeasuredPoint>,
    total_length: f64,
}

impl MeasuredPolyline {
    /// The measured vertices, in order.
    #[must_use]
    pub fn points(&self) -> &[MeasuredPoint] {
        &self.points
    }

    /// Total arc length in input units (pixels).
    #[must_use]
    pub const fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: construction rejects empty input.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over consecutive vertex pairs.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points.windows(2).map(|pair| Segment {
            start: pair[0].point,
            end: pair[1].point,
            length: pair[0].length_to_next,
        })
    }

    /// Position at arc-length `distance` from the first vertex.
    ///
    /// Saturates to the first vertex for negative distances and to the
    /// last vertex for distances beyond the total length.
    #[must_use]
    pub fn point_at(&self, distance: f64) -> Vector {
        let first = self.points.first().map_or(Vector::ZERO, |p| p.point);
        if distance <= 0.0 {
            return first;
        }

        let mut walked = 0.0;
        for segment in self.segments() {
            let end = walked + segment.length;
            if distance <= end && segment.length > 0.0 {
                return segment
                    .start
                    .lerp(segment.end, (distance - walked) / segment.length);
            }
            walked = end;
        }
        self.points.last().map_or(first, |p| p.point)
    }
}

/// Measure a polyline given its vertices in pixel space.
///
/// Single pass over consecutive pairs. A single vertex yields one point
/// record and a total length of zero.
///
/// # Errors
///
/// Returns [`AnnotateError::EmptyPolyline`] if `vertices` is empty.
///
/// # Examples
///
/// ```
/// use slkmap_core::{Vector, measure};
///
/// let square = [
///     Vector::new(0.0, 0.0),
///     Vector::new(1.0, 0.0),
///     Vector::new(1.0, 1.0),
///     Vector::new(0.0, 1.0),
///     Vector::new(0.0, 0.0),
/// ];
/// let measured = measure(&square).unwrap();
/// assert_eq!(measured.total_length(), 4.0);
/// ```
pub fn measure(vertices: &[Vector]) -> Result<MeasuredPolyline, AnnotateError> {
    let Some(&last) = vertices.last() else {
        return Err(AnnotateError::EmptyPolyline);
    };

    let mut points = Vec::with_capacity(vertices.len());
    let mut total_length = 0.0;
    for pair in vertices.windows(2) {
        let length = pair[0].distance_to(pair[1]);
        points.push(MeasuredPoint {
            point: pair[0],
            length_to_next: length,
        });
        total_length += length;
    }
    points.push(MeasuredPoint {
        point: last,
        length_to_next: 0.0,
    });

    Ok(MeasuredPolyline {
        points,
        total_length,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Vector> {
        vec![
            Vector::new(0.0, 0.0),
            Vector::new(1.0, 0.0),
            Vector::new(1.0, 1.0),
            Vector::new(0.0, 1.0),
        ]
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(measure(&[]), Err(AnnotateError::EmptyPolyline));
    }

    #[test]
    fn single_vertex_has_zero_length() {
        let measured = measure(&[Vector::new(3.0, 4.0)]).unwrap();
        assert_eq!(measured.len(), 1);
        assert!(measured.total_length().abs() < f64::EPSILON);
        assert!(measured.points()[0].length_to_next.abs() < f64::EPSILON);
        assert_eq!(measured.segments().count(), 0);
    }

    #[test]
    fn square_path_segment_lengths() {
        // Four vertices: three real sides plus the sentinel.
        let measured = measure(&unit_square()).unwrap();
        let lengths: Vec<f64> = measured.points().iter().map(|p| p.length_to_next).collect();
        assert_eq!(lengths, vec![1.0, 1.0, 1.0, 0.0]);
        assert!((measured.total_length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn closed_unit_square_total_is_four() {
        let mut closed = unit_square();
        closed.push(Vector::new(0.0, 0.0));
        let measured = measure(&closed).unwrap();
        assert!((measured.total_length() - 4.0).abs() < 1e-12);
        let points = measured.points();
        assert!(points[..4].iter().all(|p| (p.length_to_next - 1.0).abs() < 1e-12));
        assert!(points[4].length_to_next.abs() < f64::EPSILON);
    }

    #[test]
    fn total_is_sum_of_segments() {
        let measured = measure(&[
            Vector::new(0.0, 0.0),
            Vector::new(3.0, 4.0),
            Vector::new(3.0, 4.0),
            Vector::new(6.0, 8.0),
        ])
        .unwrap();
        let sum: f64 = measured.segments().map(|s| s.length).sum();
        assert!((measured.total_length() - sum).abs() < 1e-12);
        assert!((sum - 10.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_segment_has_no_direction() {
        let measured = measure(&[Vector::new(1.0, 1.0), Vector::new(1.0, 1.0)]).unwrap();
        let segment = measured.segments().next().unwrap();
        assert!(segment.direction().is_none());
    }

    #[test]
    fn point_at_interpolates_and_saturates() {
        let measured = measure(&unit_square()).unwrap();
        assert_eq!(measured.point_at(-1.0), Vector::new(0.0, 0.0));
        let p = measured.point_at(1.5);
        assert!(p.distance_to(Vector::new(1.0, 0.5)) < 1e-12);
        assert_eq!(measured.point_at(10.0), Vector::new(0.0, 1.0));
    }
}
