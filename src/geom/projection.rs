use crate::Point;
use crate::Vector;
use anyhow::Result;

/// Orthonormal basis for projecting 3D points onto a 2D plane and back.
///
/// `u × v` equals the plane normal, so counter-clockwise order in (u, v)
/// is counter-clockwise around the normal.
#[derive(Debug, Clone, Copy)]
pub struct PlaneBasis {
    pub origin: Point,
    pub u: Vector,
    pub v: Vector,
    pub normal: Vector,
}

impl PlaneBasis {
    /// Creates a basis whose `u` axis follows `edge` (projected onto the plane).
    pub fn from_edge(origin: Point, edge: Vector, normal: Vector) -> Result<Self> {
        let n = normal.normalize()?;
        let along = edge - n * edge.dot(&n);
        let u = along.normalize()?;
        let v = n.cross(&u).normalize()?;
        Ok(Self {
            origin,
            u,
            v,
            normal: n,
        })
    }

    /// In-plane (u, v) coordinates of `p`.
    pub fn project(&self, p: Point) -> (f64, f64) {
        let r = p - self.origin;
        (r.dot(&self.u), r.dot(&self.v))
    }

    pub fn unproject(&self, x: f64, y: f64) -> Point {
        self.origin + self.u * x + self.v * y
    }

    /// Signed distance of `p` from the plane along the normal.
    pub fn signed_distance(&self, p: Point) -> f64 {
        (p - self.origin).dot(&self.normal)
    }
}
