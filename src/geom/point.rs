use crate::Vector;
use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Location in 3D space. Sample points and mesh vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn is_close(&self, other: &Self) -> bool {
        self.distance_to(other) < EPS
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }

    /// Vertex centroid, `None` for an empty slice.
    pub fn mean(pts: &[Point]) -> Option<Self> {
        let first = pts.first()?;
        let sum = pts[1..]
            .iter()
            .fold(Vector::new(first.x, first.y, first.z), |acc, p| {
                acc + Vector::new(p.x, p.y, p.z)
            });
        Some(Self::new(0., 0., 0.) + sum * (1. / pts.len() as f64))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        write!(f, "({:.prec$}, {:.prec$}, {:.prec$})", self.x, self.y, self.z)
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, v: Vector) -> Point {
        Point::new(self.x + v.dx, self.y + v.dy, self.z + v.dz)
    }
}

impl Sub for Point {
    type Output = Vector;
    fn sub(self, other: Self) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}
