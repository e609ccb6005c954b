//! Planar vector value type.
//!
//! [`Vector`] is `Copy` and every operation returns a new value, so no
//! call site can accidentally mutate an operand it still needs. Points
//! and directions share the type; the geometry code never needs to
//! distinguish them.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A 2D point or direction in screen-pixel space.
///
/// Deserializes from either `{"x": .., "y": ..}` or `[x, y]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "VectorRepr")]
pub struct Vector {
    /// Horizontal component (pixels from the left edge).
    pub x: f64,
    /// Vertical component (pixels from the top edge).
    pub y: f64,
}

/// Accepted wire shapes for a [`Vector`].
#[derive(Deserialize)]
#[serde(untagged)]
enum VectorRepr {
    Object { x: f64, y: f64 },
    Pair([f64; 2]),
}

impl From<VectorRepr> for Vector {
    fn from(repr: VectorRepr) -> Self {
        match repr {
            VectorRepr::Object { x, y } => Self::new(x, y),
            VectorRepr::Pair(pair) => pair.into(),
        }
    }
}

impl From<[f64; 2]> for Vector {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector of the given `length` pointing at `angle` radians
    /// (measured from the positive x axis, towards positive y).
    #[must_use]
    pub fn from_angle_length(angle: f64, length: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos * length, sin * length)
    }

    /// Multiply both components by `scalar`.
    #[must_use]
    pub fn scale(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }

    /// Divide both components by `scalar`.
    ///
    /// Dividing by zero yields non-finite components; see [`Self::is_finite`].
    #[must_use]
    pub fn scale_divide(self, scalar: f64) -> Self {
        Self::new(self.x / scalar, self.y / scalar)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// Z component of the 3D cross product (`self.x * other.y - self.y * other.x`).
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }

    /// `(self - origin) . direction`: the projection of this point onto
    /// `direction`, measured from `origin`.
    #[must_use]
    pub fn minus_dot(self, origin: Self, direction: Self) -> f64 {
        (self - origin).dot(direction)
    }

    /// Rotate by +90 degrees: `(x, y) -> (-y, x)`.
    ///
    /// ```
    /// use slkmap_core::Vector;
    ///
    /// assert_eq!(Vector::new(1.0, 0.0).left(), Vector::new(0.0, 1.0));
    /// ```
    #[must_use]
    pub const fn left(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Rotate by -90 degrees: `(x, y) -> (y, -x)`.
    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.y, -self.x)
    }

    /// Squared length. Avoids the square root for comparisons.
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Angle of the vector in radians, `atan2(y, x)`.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared_to(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Normalize to unit length.
    ///
    /// Not guarded: the zero vector produces `NaN` components. Use
    /// [`Self::try_unit`] where a degenerate direction is possible.
    #[must_use]
    pub fn unit(self) -> Self {
        self.scale_divide(self.length())
    }

    /// Normalize to unit length, or `None` when the length is zero or
    /// not finite.
    #[must_use]
    pub fn try_unit(self) -> Option<Self> {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            Some(self.scale_divide(length))
        } else {
            None
        }
    }

    /// Point halfway between `a` and `b`.
    #[must_use]
    pub fn midpoint(a: Self, b: Self) -> Self {
        Self::new(f64::midpoint(a.x, b.x), f64::midpoint(a.y, b.y))
    }

    /// Linear interpolation towards `towards`: `t = 0` is `self`,
    /// `t = 1` is `towards`.
    #[must_use]
    pub fn lerp(self, towards: Self, t: f64) -> Self {
        Self::new(
            (towards.x - self.x).mul_add(t, self.x),
            (towards.y - self.y).mul_add(t, self.y),
        )
    }

    /// Returns `true` if both components are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.2} {:.2}]", self.x, self.y)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    fn assert_close(a: Vector, b: Vector) {
        assert!(
            a.distance_to(b) < 1e-12,
            "expected {b:?}, got {a:?} (distance {})",
            a.distance_to(b),
        );
    }

    #[test]
    fn operators_leave_operands_untouched() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(3.0, -4.0);
        let sum = a + b;
        let difference = a - b;
        assert_eq!(sum, Vector::new(4.0, -2.0));
        assert_eq!(difference, Vector::new(-2.0, 6.0));
        assert_eq!(a, Vector::new(1.0, 2.0));
        assert_eq!(b, Vector::new(3.0, -4.0));
    }

    #[test]
    fn assign_operators() {
        let mut v = Vector::new(1.0, 1.0);
        v += Vector::new(2.0, 3.0);
        assert_eq!(v, Vector::new(3.0, 4.0));
        v -= Vector::new(1.0, 1.0);
        assert_eq!(v, Vector::new(2.0, 3.0));
    }

    #[test]
    fn scale_and_divide() {
        let v = Vector::new(3.0, -6.0);
        assert_eq!(v.scale(2.0), Vector::new(6.0, -12.0));
        assert_eq!(v * 2.0, v.scale(2.0));
        assert_eq!(v.scale_divide(3.0), Vector::new(1.0, -2.0));
        assert_eq!(-v, Vector::new(-3.0, 6.0));
    }

    #[test]
    fn dot_and_cross() {
        let x = Vector::new(1.0, 0.0);
        let y = Vector::new(0.0, 1.0);
        assert!(x.dot(y).abs() < f64::EPSILON);
        assert!((x.cross(y) - 1.0).abs() < f64::EPSILON);
        assert!((y.cross(x) + 1.0).abs() < f64::EPSILON);
        assert!((Vector::new(2.0, 3.0).dot(Vector::new(4.0, 5.0)) - 23.0).abs() < 1e-12);
    }

    #[test]
    fn minus_dot_projects_from_origin() {
        let p = Vector::new(5.0, 7.0);
        let origin = Vector::new(1.0, 7.0);
        let direction = Vector::new(1.0, 0.0);
        assert!((p.minus_dot(origin, direction) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn left_and_right_rotate_quarter_turns() {
        let v = Vector::new(2.0, 1.0);
        assert_eq!(v.left(), Vector::new(-1.0, 2.0));
        assert_eq!(v.right(), Vector::new(1.0, -2.0));
        assert_eq!(v.left().right(), v);
        assert!((v.left().angle() - v.angle() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn length_and_distance() {
        let v = Vector::new(3.0, 4.0);
        assert!((v.length() - 5.0).abs() < 1e-12);
        assert!((v.length_squared() - 25.0).abs() < 1e-12);
        assert!((Vector::ZERO.distance_to(v) - 5.0).abs() < 1e-12);
        assert!((Vector::ZERO.distance_squared_to(v) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn angle_uses_atan2() {
        assert!(Vector::new(1.0, 0.0).angle().abs() < 1e-12);
        assert!((Vector::new(0.0, 1.0).angle() - FRAC_PI_2).abs() < 1e-12);
        assert!((Vector::new(-1.0, 0.0).angle() - PI).abs() < 1e-12);
    }

    #[test]
    fn unit_normalizes() {
        assert_close(Vector::new(0.0, 5.0).unit(), Vector::new(0.0, 1.0));
        assert!((Vector::new(3.0, 4.0).unit().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unit_of_zero_is_not_finite() {
        assert!(!Vector::ZERO.unit().is_finite());
        assert!(Vector::ZERO.try_unit().is_none());
        assert!(Vector::new(f64::NAN, 1.0).try_unit().is_none());
        assert!(Vector::new(f64::INFINITY, 1.0).try_unit().is_none());
    }

    #[test]
    fn midpoint_and_lerp() {
        let a = Vector::new(0.0, 0.0);
        let b = Vector::new(10.0, -20.0);
        assert_eq!(Vector::midpoint(a, b), Vector::new(5.0, -10.0));
        assert_close(a.lerp(b, 0.25), Vector::new(2.5, -5.0));
        assert_close(a.lerp(b, 0.0), a);
        assert_close(a.lerp(b, 1.0), b);
    }

    #[test]
    fn from_angle_length_round_trips_angle() {
        let v = Vector::from_angle_length(FRAC_PI_2, 3.0);
        assert_close(v, Vector::new(0.0, 3.0));
    }

    #[test]
    fn deserializes_from_object_and_pair() {
        let object: Vector = serde_json::from_str(r#"{"x": 1.5, "y": -2}"#).unwrap();
        let pair: Vector = serde_json::from_str("[1.5, -2]").unwrap();
        assert_eq!(object, Vector::new(1.5, -2.0));
        assert_eq!(object, pair);
    }

    #[test]
    fn display_rounds_to_two_places() {
        assert_eq!(Vector::new(1.0, 2.346).to_string(), "[1.00 2.35]");
    }
}
