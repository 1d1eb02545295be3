//! Geometry primitives: points, vectors, planar polygons and face meshes.

pub mod bboxes;
pub mod mesh;
pub mod point;
pub mod polygon;
pub mod projection;
pub mod ray;
pub mod segment;
pub mod triangles;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-10;
