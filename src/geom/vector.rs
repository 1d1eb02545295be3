use crate::geom::EPS;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Free 3D vector (direction and magnitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Right-handed cross product `self × other`.
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.dy * other.dz - self.dz * other.dy,
            self.dz * other.dx - self.dx * other.dz,
            self.dx * other.dy - self.dy * other.dx,
        )
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy + self.dz * other.dz
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn is_close(&self, other: &Self) -> bool {
        (*self - *other).length() < EPS
    }

    /// Unit vector in the same direction. Fails for (near) zero vectors.
    pub fn normalize(&self) -> Result<Self> {
        let len = self.length();
        if len < EPS || !len.is_finite() {
            return Err(anyhow!("Cannot normalize vector {self} of length {len}"));
        }
        Ok(*self * (1. / len))
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2);
        write!(
            f,
            "Vector({:.prec$}, {:.prec$}, {:.prec$})",
            self.dx, self.dy, self.dz
        )
    }
}

impl Add for Vector {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.dx + other.dx, self.dy + other.dy, self.dz + other.dz)
    }
}

impl Sub for Vector {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.dx - other.dx, self.dy - other.dy, self.dz - other.dz)
    }
}

impl Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, k: f64) -> Self {
        Self::new(self.dx * k, self.dy * k, self.dz * k)
    }
}

impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.dx, -self.dy, -self.dz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_is_right_handed() {
        let x = Vector::new(1., 0., 0.);
        let y = Vector::new(0., 1., 0.);
        assert_eq!(x.cross(&y), Vector::new(0., 0., 1.));
        assert_eq!(y.cross(&x), -Vector::new(0., 0., 1.));
    }

    #[test]
    fn test_normalize() {
        let n = Vector::new(0., -3., 4.).normalize().unwrap();
        assert!(n.is_close(&Vector::new(0., -0.6, 0.8)));
        assert!((n.length() - 1.).abs() < 1e-15);
        assert!(Vector::new(0., 0., 0.).normalize().is_err());
        assert!(Vector::new(f64::NAN, 0., 0.).normalize().is_err());
    }

    #[test]
    fn test_display_precision() {
        let v = Vector::new(1., 0.5, -2.);
        assert_eq!(format!("{v}"), "Vector(1.00, 0.50, -2.00)");
        assert_eq!(format!("{v:.1}"), "Vector(1.0, 0.5, -2.0)");
    }
}
