//! Ray casting against convex planar faces.

use crate::geom::EPS;
use crate::{Point, Vector};

/// Half-line from `origin` along the unit `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vector,
}

impl Ray {
    /// `None` for a zero direction.
    pub fn new(origin: Point, direction: Vector) -> Option<Self> {
        let direction = direction.normalize().ok()?;
        Some(Self { origin, direction })
    }

    pub fn from_points(origin: Point, target: Point) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the crossing with a convex planar face.
    ///
    /// `pts` must be wound counter-clockwise around the unit `normal`.
    /// The crossing counts only if it lies inside edge `i` (from `pts[i]`
    /// to `pts[i + 1]`) by more than `edge_tol[i]`. A positive tolerance
    /// rejects grazing hits on that edge, a negative one accepts hits just
    /// outside it. Missing entries count as 0.
    pub fn intersect_convex_face(
        &self,
        pts: &[Point],
        normal: &Vector,
        edge_tol: &[f64],
    ) -> Option<f64> {
        if pts.len() < 3 {
            return None;
        }
        let denom = normal.dot(&self.direction);
        if denom.abs() < EPS {
            return None; // Ray parallel to face plane
        }
        let t = normal.dot(&(pts[0] - self.origin)) / denom;
        if t <= 0. {
            return None;
        }
        let hit = self.point_at(t);

        let n = pts.len();
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            let edge = b - a;
            let len = edge.length();
            if len < EPS {
                continue;
            }
            let inside = edge.cross(&(hit - a)).dot(normal) / len;
            if inside < edge_tol.get(i).copied().unwrap_or(0.) {
                return None;
            }
        }
        Some(t)
    }
}
