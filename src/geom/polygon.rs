//! Planar polygons.
//!
//! Vertices are ordered counter-clockwise around the normal (right-hand rule).
//! Enclosure surfaces follow the building convention: normals point away
//! from the zone interior.

use crate::geom::EPS;
use crate::geom::projection::PlaneBasis;
use crate::geom::segment::closest_point_on_segment;
use crate::geom::triangles::{TriangleIndex, signed_area_2d, triangulate_2d};
use crate::{Point, Vector};
use anyhow::{Result, anyhow};

/// Maximum distance of a vertex from the polygon plane.
const PLANARITY_TOL: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct Polygon {
    pub name: String,
    pts: Vec<Point>,
    vn: Vector,
    basis: PlaneBasis,
    pts_2d: Vec<(f64, f64)>,
    tri: Vec<TriangleIndex>,
    area: f64,
}

impl Polygon {
    /// Creates a planar polygon.
    ///
    /// If `normal` is given and points against the winding of `pts`,
    /// the vertex order is reversed so that winding and normal agree.
    pub fn new(name: String, pts: Vec<Point>, normal: Option<Vector>) -> Result<Self> {
        if pts.len() < 3 {
            return Err(anyhow!("Polygon {name} must have at least 3 vertices"));
        }
        let mut pts = pts;
        let mut vn = newell_normal(&pts)
            .normalize()
            .map_err(|_| anyhow!("Polygon {name} is degenerate (zero area)"))?;
        if let Some(n) = normal {
            if n.dot(&vn) < 0. {
                pts.reverse();
                vn = -vn;
            }
        }

        let basis = PlaneBasis::from_edge(pts[0], pts[1] - pts[0], vn)
            .or_else(|_| PlaneBasis::from_edge(pts[0], pts[2] - pts[0], vn))?;
        if let Some(off) = pts
            .iter()
            .map(|p| basis.signed_distance(*p).abs())
            .find(|d| *d > PLANARITY_TOL)
        {
            return Err(anyhow!("Polygon {name} is not planar (vertex {off:.3e} off plane)"));
        }

        let pts_2d: Vec<(f64, f64)> = pts.iter().map(|p| basis.project(*p)).collect();
        let tri = triangulate_2d(&pts_2d)?;
        let area = 0.5 * signed_area_2d(&pts_2d).abs();

        Ok(Self {
            name,
            pts,
            vn,
            basis,
            pts_2d,
            tri,
            area,
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    /// Unit normal.
    pub fn normal(&self) -> Vector {
        self.vn
    }

    pub fn basis(&self) -> &PlaneBasis {
        &self.basis
    }

    /// Vertices in the polygon's plane coordinates.
    pub fn vertices_2d(&self) -> &[(f64, f64)] {
        &self.pts_2d
    }

    pub fn triangles(&self) -> &[TriangleIndex] {
        &self.tri
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Checks whether the plane coordinates (u, v) fall inside the polygon
    /// (boundary included).
    pub fn contains_2d(&self, u: f64, v: f64) -> bool {
        let n = self.pts_2d.len();
        let mut inside = false;
        for i in 0..n {
            let (x0, y0) = self.pts_2d[i];
            let (x1, y1) = self.pts_2d[(i + 1) % n];
            if is_on_segment_2d((u, v), (x0, y0), (x1, y1)) {
                return true;
            }
            if (y0 > v) != (y1 > v) {
                let x_cross = x0 + (v - y0) * (x1 - x0) / (y1 - y0);
                if u < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Closest point on the polygon (interior or boundary) to `pt`.
    pub fn closest_point(&self, pt: Point) -> Point {
        let (u, v) = self.basis.project(pt);
        if self.contains_2d(u, v) {
            return self.basis.unproject(u, v);
        }
        let n = self.pts.len();
        (0..n)
            .map(|i| closest_point_on_segment(pt, self.pts[i], self.pts[(i + 1) % n]))
            .min_by(|a, b| pt.distance_to(a).total_cmp(&pt.distance_to(b)))
            .unwrap_or(self.pts[0])
    }
}

/// Newell's method: area-weighted normal of a (nearly) planar loop.
fn newell_normal(pts: &[Point]) -> Vector {
    let n = pts.len();
    let mut vn = Vector::new(0., 0., 0.);
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        vn.dx += (a.y - b.y) * (a.z + b.z);
        vn.dy += (a.z - b.z) * (a.x + b.x);
        vn.dz += (a.x - b.x) * (a.y + b.y);
    }
    vn
}

fn is_on_segment_2d(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> bool {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    if len2 < EPS * EPS {
        return (p.0 - a.0).hypot(p.1 - a.1) < EPS;
    }
    let t = ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2;
    if !(-EPS..=1. + EPS).contains(&t) {
        return false;
    }
    let cross = (p.0 - a.0) * dy - (p.1 - a.1) * dx;
    cross.abs() / len2.sqrt() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_4x3() -> Result<Polygon> {
        // Wall in the plane y = 0, normal +y
        Polygon::new(
            "wall".to_string(),
            vec![
                Point::new(-2., 0., -1.5),
                Point::new(-2., 0., 1.5),
                Point::new(2., 0., 1.5),
                Point::new(2., 0., -1.5),
            ],
            None,
        )
    }

    #[test]
    fn test_normal_and_area() -> Result<()> {
        let poly = wall_4x3()?;
        assert!(poly.normal().is_close(&Vector::new(0., 1., 0.)));
        assert!((poly.area() - 12.0).abs() < 1e-12);
        assert_eq!(poly.triangles().len(), 2);
        Ok(())
    }

    #[test]
    fn test_normal_hint_reverses_winding() -> Result<()> {
        let poly = Polygon::new(
            "floor".to_string(),
            vec![
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(1., 1., 0.),
                Point::new(0., 1., 0.),
            ],
            Some(Vector::new(0., 0., -1.)),
        )?;
        assert!(poly.normal().is_close(&Vector::new(0., 0., -1.)));
        Ok(())
    }

    #[test]
    fn test_rejects_degenerate_and_non_planar() {
        let collinear = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(2., 0., 0.),
        ];
        assert!(Polygon::new("bad".to_string(), collinear, None).is_err());

        let twisted = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(1., 1., 0.5),
            Point::new(0., 1., 0.),
        ];
        assert!(Polygon::new("bad".to_string(), twisted, None).is_err());
    }

    #[test]
    fn test_closest_point_in_front() -> Result<()> {
        let poly = wall_4x3()?;
        let c = poly.closest_point(Point::new(0.5, -2., 0.3));
        assert!(c.is_close(&Point::new(0.5, 0., 0.3)));
        Ok(())
    }

    #[test]
    fn test_closest_point_beyond_corner() -> Result<()> {
        let poly = wall_4x3()?;
        let pt = Point::new(5., -4., 1.5);
        let c = poly.closest_point(pt);
        assert!(c.is_close(&Point::new(2., 0., 1.5)));
        assert!((pt.distance_to(&c) - 5.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_contains_2d_l_shape() -> Result<()> {
        let poly = Polygon::new(
            "l".to_string(),
            vec![
                Point::new(0., 0., 0.),
                Point::new(2., 0., 0.),
                Point::new(2., 1., 0.),
                Point::new(1., 1., 0.),
                Point::new(1., 2., 0.),
                Point::new(0., 2., 0.),
            ],
            None,
        )?;
        let inside = poly.basis().project(Point::new(0.5, 1.5, 0.));
        let notch = poly.basis().project(Point::new(1.5, 1.5, 0.));
        let edge = poly.basis().project(Point::new(2., 0.5, 0.));
        assert!(poly.contains_2d(inside.0, inside.1));
        assert!(!poly.contains_2d(notch.0, notch.1));
        assert!(poly.contains_2d(edge.0, edge.1));
        Ok(())
    }
}
