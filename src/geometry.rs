//! Fundamental geometric types for barrier modelling.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Position in three dimensional space measured in metres.
///
/// The barrier line runs along the global Y axis, X points upslope across the
/// barrier and Z is vertical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    #[serde(default)]
    pub x: f64,
    /// Distance along the global Y axis.
    #[serde(default)]
    pub y: f64,
    /// Distance along the global Z axis.
    #[serde(default)]
    pub z: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance to `other` in metres.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }

    /// Return `true` when every coordinate is a finite number.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vector3<f64>> for Point {
    fn from(value: Vector3<f64>) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl From<Point> for Vector3<f64> {
    fn from(value: Point) -> Self {
        value.to_vector()
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use rockfall_barrier::point;
///
/// let origin = point(0.0, 0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64, z: f64) -> Point {
    Point::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_to_vector_roundtrip() {
        let origin = Point::new(1.0, 2.0, 3.0);
        let vector: Vector3<f64> = origin.into();
        assert_eq!(vector, Vector3::new(1.0, 2.0, 3.0));
        let point = Point::from(vector);
        assert_eq!(point, origin);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = point(0.0, 0.0, 0.0);
        let b = point(3.0, 4.0, 0.0);
        assert!((a.distance_to(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_coordinates_deserialize_as_zero() {
        let point: Point = serde_json::from_str(r#"{"x": 1.5}"#).expect("valid json");
        assert_eq!(point, Point::new(1.5, 0.0, 0.0));
    }
}
