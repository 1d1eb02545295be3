//! Coarse occluder geometry shared by all visibility queries of a run.

use std::collections::HashMap;

use crate::geom::EPS;
use crate::geom::bboxes::bounding_box;
use crate::geom::mesh::{Mesh, raw_face_normal};
use crate::sim::view_factor::transmissivity::Transmissivity;
use crate::sim::view_factor::visibility::EDGE_TOL;
use crate::sim::view_factor::voxel_grid::VoxelGrid;
use crate::{Point, Vector};

/// Geometry an occluder face was tessellated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OccluderOwner {
    /// Bounding surface index.
    Surface(usize),
    /// Additional shading object index.
    Shading(usize),
}

/// Vertex coordinates are snapped to this grid when matching shared edges.
const SEAM_SNAP: f64 = 1e-9;

type VertexKey = (i64, i64, i64);

/// A convex planar face of a coarse mesh.
#[derive(Debug, Clone)]
pub struct OccluderFace {
    pub pts: Vec<Point>,
    pub normal: Vector,
    pub owner: OccluderOwner,
    /// Per-edge tolerance for ray crossings (edge `i` runs from `pts[i]`).
    /// Outline edges reject grazing hits, seams shared with another face
    /// of the same object accept them.
    pub edge_tol: Vec<f64>,
    slot: usize,
}

impl OccluderFace {
    fn edge_keys(&self) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| {
            let (a, b) = (vertex_key(&self.pts[i]), vertex_key(&self.pts[(i + 1) % n]));
            if a <= b { (a, b) } else { (b, a) }
        })
    }
}

fn vertex_key(p: &Point) -> VertexKey {
    let snap = |c: f64| (c / SEAM_SNAP).round() as i64;
    (snap(p.x), snap(p.y), snap(p.z))
}

/// Coarse meshes of every occluding surface and shading object.
///
/// Built once per run, then only read.
#[derive(Debug, Clone)]
pub struct OccluderSet {
    faces: Vec<OccluderFace>,
    transmissivity: Vec<Transmissivity>,
    grid: VoxelGrid,
}

impl OccluderSet {
    /// Builds the set from `(owner, coarse mesh, transmissivity)` entries.
    ///
    /// Degenerate faces (zero area or unsupported vertex count) are skipped.
    pub fn build(entries: Vec<(OccluderOwner, &Mesh, Transmissivity)>) -> Self {
        let mut faces = Vec::new();
        let mut bboxes: Vec<(Point, Point)> = Vec::new();
        let mut transmissivity = Vec::with_capacity(entries.len());
        for (slot, (owner, mesh, t)) in entries.into_iter().enumerate() {
            transmissivity.push(t);
            for k in 0..mesh.face_count() {
                let Ok(pts) = mesh.face_points(k) else {
                    continue;
                };
                let Ok(normal) = raw_face_normal(&pts).and_then(|n| n.normalize()) else {
                    continue;
                };
                let Some(bbox) = bounding_box(&pts) else {
                    continue;
                };
                bboxes.push(bbox);
                faces.push(OccluderFace {
                    pts,
                    normal,
                    owner,
                    edge_tol: Vec::new(),
                    slot,
                });
            }
        }
        mark_seams(&mut faces);

        let grid = VoxelGrid::new(&bboxes, VoxelGrid::auto_step(&bboxes));
        log::debug!(
            "Occluder set: {} faces from {} objects, voxel step {:.3}",
            faces.len(),
            transmissivity.len(),
            grid.step()
        );

        Self {
            faces,
            transmissivity,
            grid,
        }
    }

    pub fn faces(&self) -> &[OccluderFace] {
        &self.faces
    }

    /// Transmissivity of the object `face` belongs to.
    pub fn transmissivity_of(&self, face: &OccluderFace) -> &Transmissivity {
        &self.transmissivity[face.slot]
    }

    /// Indices of faces that may cross the segment `a -> b`, in ascending order.
    pub fn candidates(&self, a: Point, b: Point) -> Vec<usize> {
        self.grid.find_along_segment(a, b)
    }

    /// Vertical extent of the coarse faces of `owner`: (z min, z max, area).
    pub fn extent_of(&self, owner: OccluderOwner) -> Option<(f64, f64, f64)> {
        let mut zmin = f64::INFINITY;
        let mut zmax = f64::NEG_INFINITY;
        let mut area = 0.;
        for f in self.faces.iter().filter(|f| f.owner == owner) {
            for p in &f.pts {
                zmin = zmin.min(p.z);
                zmax = zmax.max(p.z);
            }
            area += raw_face_normal(&f.pts).map(|n| 0.5 * n.length()).unwrap_or(0.);
        }
        (area > EPS).then_some((zmin, zmax, area))
    }
}

/// Sets the edge tolerances: edges shared by two faces of one object are
/// tessellation seams, all others are outline edges.
fn mark_seams(faces: &mut [OccluderFace]) {
    let mut uses: HashMap<(usize, (VertexKey, VertexKey)), usize> = HashMap::new();
    for f in faces.iter() {
        for key in f.edge_keys() {
            *uses.entry((f.slot, key)).or_default() += 1;
        }
    }
    for f in faces.iter_mut() {
        let tol: Vec<f64> = f
            .edge_keys()
            .map(|key| match uses.get(&(f.slot, key)) {
                Some(&n) if n > 1 => -EDGE_TOL,
                _ => EDGE_TOL,
            })
            .collect();
        f.edge_tol = tol;
    }
}
