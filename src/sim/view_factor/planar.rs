//! Geometry Provider for planar polygons.
//!
//! Detail meshes are structured grids laid out in the polygon's plane
//! coordinates. Cells fully covered by the polygon become quads, boundary
//! cells are clipped against the polygon triangulation and fanned into
//! triangles.

use anyhow::{Result, anyhow};

use crate::geom::mesh::Mesh;
use crate::geom::triangles::{is_corner_convex, signed_area_2d};
use crate::sim::view_factor::provider::{GeometryProvider, MeshDensity};
use crate::{Point, Polygon};

/// Cap on grid cells along one polygon axis.
const DEFAULT_MAX_CELLS_PER_AXIS: usize = 500;

/// Clipped pieces smaller than this fraction of a cell are dropped.
const AREA_TOL: f64 = 1e-9;

type Pt2 = (f64, f64);

#[derive(Debug, Clone)]
pub struct PlanarProvider {
    max_cells_per_axis: usize,
}

impl PlanarProvider {
    pub fn new() -> Self {
        Self {
            max_cells_per_axis: DEFAULT_MAX_CELLS_PER_AXIS,
        }
    }

    /// Limits the detail grid resolution along each polygon axis.
    pub fn with_max_cells_per_axis(max_cells_per_axis: usize) -> Self {
        Self {
            max_cells_per_axis: max_cells_per_axis.max(1),
        }
    }
}

impl Default for PlanarProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryProvider for PlanarProvider {
    type Surface = Polygon;

    fn closest_point(&self, surface: &Polygon, pt: Point) -> Result<Point> {
        if !pt.is_finite() {
            return Err(anyhow!("Cannot project non-finite point {pt} onto {}", surface.name));
        }
        Ok(surface.closest_point(pt))
    }

    fn tessellate(&self, surface: &Polygon, density: MeshDensity) -> Result<Mesh> {
        match density {
            MeshDensity::Coarse => Ok(coarse_mesh(surface)),
            MeshDensity::EdgeLength(e) => {
                if !(e.is_finite() && e > 0.) {
                    return Err(anyhow!("Invalid target edge length {e} for {}", surface.name));
                }
                Ok(grid_mesh(surface, e, self.max_cells_per_axis))
            }
        }
    }
}

/// One face for triangles and convex quads, the triangulation otherwise.
fn coarse_mesh(poly: &Polygon) -> Mesh {
    let pts = poly.vertices();
    let mut mesh = Mesh::default();
    if pts.len() == 3 || (pts.len() == 4 && is_convex_2d(poly.vertices_2d())) {
        mesh.push_face(pts);
    } else {
        for t in poly.triangles() {
            mesh.push_face(&[pts[t.0], pts[t.1], pts[t.2]]);
        }
    }
    mesh
}

fn grid_mesh(poly: &Polygon, edge: f64, max_cells: usize) -> Mesh {
    let pts_2d = poly.vertices_2d();
    let (mut umin, mut umax) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut vmin, mut vmax) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(u, v) in pts_2d {
        umin = umin.min(u);
        umax = umax.max(u);
        vmin = vmin.min(v);
        vmax = vmax.max(v);
    }
    let nu = cells_along(umax - umin, edge, max_cells);
    let nv = cells_along(vmax - vmin, edge, max_cells);
    let du = (umax - umin) / nu as f64;
    let dv = (vmax - vmin) / nv as f64;

    let tris: Vec<[Pt2; 3]> = poly
        .triangles()
        .iter()
        .map(|t| [pts_2d[t.0], pts_2d[t.1], pts_2d[t.2]])
        .collect();

    let basis = poly.basis();
    let to_3d = |p: &Pt2| basis.unproject(p.0, p.1);
    let mut mesh = Mesh::default();

    for j in 0..nv {
        let v0 = vmin + j as f64 * dv;
        let v1 = if j + 1 == nv { vmax } else { v0 + dv };
        for i in 0..nu {
            let u0 = umin + i as f64 * du;
            let u1 = if i + 1 == nu { umax } else { u0 + du };
            let cell = [(u0, v0), (u1, v0), (u1, v1), (u0, v1)];
            let cell_area = (u1 - u0) * (v1 - v0);

            let pieces: Vec<Vec<Pt2>> = tris
                .iter()
                .filter(|t| overlaps_cell(t, u0, u1, v0, v1))
                .map(|t| clip_to_triangle(&cell, t))
                .filter(|p| p.len() >= 3 && 0.5 * signed_area_2d(p) > AREA_TOL * cell_area)
                .collect();
            if pieces.is_empty() {
                continue;
            }

            let covered: f64 = pieces.iter().map(|p| 0.5 * signed_area_2d(p)).sum();
            if (covered - cell_area).abs() <= AREA_TOL * cell_area {
                let quad: Vec<Point> = cell.iter().map(to_3d).collect();
                mesh.push_face(&quad);
                continue;
            }
            for piece in &pieces {
                for k in 1..piece.len() - 1 {
                    let tri = [piece[0], piece[k], piece[k + 1]];
                    if 0.5 * signed_area_2d(&tri) > AREA_TOL * cell_area {
                        let tri_3d: Vec<Point> = tri.iter().map(to_3d).collect();
                        mesh.push_face(&tri_3d);
                    }
                }
            }
        }
    }
    mesh
}

fn cells_along(length: f64, edge: f64, max_cells: usize) -> usize {
    // Slack keeps exact multiples of the edge length from gaining a sliver row.
    let n = (length / edge - 1e-9).ceil();
    if n.is_finite() && n >= 1. {
        (n as usize).min(max_cells)
    } else {
        1
    }
}

fn overlaps_cell(t: &[Pt2; 3], u0: f64, u1: f64, v0: f64, v1: f64) -> bool {
    let tumin = t[0].0.min(t[1].0).min(t[2].0);
    let tumax = t[0].0.max(t[1].0).max(t[2].0);
    let tvmin = t[0].1.min(t[1].1).min(t[2].1);
    let tvmax = t[0].1.max(t[1].1).max(t[2].1);
    tumin < u1 && tumax > u0 && tvmin < v1 && tvmax > v0
}

/// Sutherland-Hodgman clipping of a counter-clockwise polygon against a
/// counter-clockwise triangle.
fn clip_to_triangle(subject: &[Pt2], tri: &[Pt2; 3]) -> Vec<Pt2> {
    let mut output: Vec<Pt2> = subject.to_vec();
    for e in 0..3 {
        if output.is_empty() {
            break;
        }
        let a = tri[e];
        let b = tri[(e + 1) % 3];
        let side = |p: Pt2| (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);

        let input = std::mem::take(&mut output);
        let n = input.len();
        for i in 0..n {
            let cur = input[i];
            let prev = input[(i + n - 1) % n];
            let (s_cur, s_prev) = (side(cur), side(prev));
            if s_cur >= 0. {
                if s_prev < 0. {
                    output.push(lerp(prev, cur, s_prev / (s_prev - s_cur)));
                }
                output.push(cur);
            } else if s_prev >= 0. {
                output.push(lerp(prev, cur, s_prev / (s_prev - s_cur)));
            }
        }
    }
    output
}

fn lerp(a: Pt2, b: Pt2, t: f64) -> Pt2 {
    (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
}

fn is_convex_2d(pts: &[Pt2]) -> bool {
    let n = pts.len();
    (0..n).all(|i| is_corner_convex(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]))
}
