//! Face-vertex meshes produced by surface tessellation.

use crate::{Point, Vector};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// A polygon mesh defined by vertices and faces (vertex index loops).
///
/// Tessellators emit triangles and quads; faces are wound counter-clockwise
/// around the face normal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point>,
    pub faces: Vec<Vec<usize>>,
}

impl Mesh {
    /// Creates a new mesh with the given vertices and faces.
    pub fn new(vertices: Vec<Point>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Returns the vertex positions of face `k`.
    pub fn face_points(&self, k: usize) -> Result<Vec<Point>> {
        let face = self
            .faces
            .get(k)
            .ok_or_else(|| anyhow!("Face {k} out of range ({} faces)", self.faces.len()))?;
        face.iter()
            .map(|&i| {
                self.vertices
                    .get(i)
                    .copied()
                    .ok_or_else(|| anyhow!("Face {k} references missing vertex {i}"))
            })
            .collect()
    }

    /// Face center as the mean of the face vertices.
    pub fn face_center(&self, k: usize) -> Result<Point> {
        let pts = self.face_points(k)?;
        Point::mean(&pts).ok_or_else(|| anyhow!("Face {k} has no vertices"))
    }

    /// Adds a face given by its vertex positions.
    pub fn push_face(&mut self, pts: &[Point]) {
        let start = self.vertices.len();
        self.vertices.extend_from_slice(pts);
        self.faces.push((start..start + pts.len()).collect());
    }
}

/// Non-normalized face normal: edge cross product for triangles,
/// diagonal cross product for quads. Its length is twice the face area.
pub fn raw_face_normal(pts: &[Point]) -> Result<Vector> {
    match pts.len() {
        3 => Ok((pts[1] - pts[0]).cross(&(pts[2] - pts[0]))),
        4 => Ok((pts[2] - pts[0]).cross(&(pts[3] - pts[1]))),
        n => Err(anyhow!("Face with {n} vertices is not a triangle or quad")),
    }
}
