//! Mesh element property extraction.

use crate::error::{Result, VfError};
use crate::geom::EPS;
use crate::geom::mesh::{Mesh, raw_face_normal};
use crate::{Point, Vector};

/// One face of a detail mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshElement {
    pub area: f64,
    /// Unit normal, pointing away from the enclosure interior.
    pub normal: Vector,
    pub centroid: Point,
}

/// Computes area, unit normal and centroid of every face of a detail mesh
/// in a single pass.
///
/// Triangle area comes from two edges sharing a vertex, quad area from the
/// cross product of its diagonals. Zero-area faces are skipped.
pub fn extract_elements(mesh: &Mesh, point: usize, surface: usize) -> Result<Vec<MeshElement>> {
    let mut elements = Vec::with_capacity(mesh.face_count());
    for (k, face) in mesh.faces().iter().enumerate() {
        if !(3..=4).contains(&face.len()) {
            return Err(VfError::UnsupportedFaceTopology {
                surface,
                face: k,
                vertices: face.len(),
            });
        }
        let to_err = |e: anyhow::Error| VfError::Discretization {
            surface,
            point: Some(point),
            reason: format!("{e:#}"),
        };
        let pts = mesh.face_points(k).map_err(to_err)?;
        let raw = raw_face_normal(&pts).map_err(to_err)?;
        let len = raw.length();
        if len < EPS {
            continue;
        }
        let centroid = mesh.face_center(k).map_err(to_err)?;
        elements.push(MeshElement {
            area: 0.5 * len,
            normal: raw * (1. / len),
            centroid,
        });
    }
    Ok(elements)
}
