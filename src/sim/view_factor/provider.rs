//! Geometry Provider interface.
//!
//! The engine never inspects surface geometry directly. It only asks the
//! provider for closest points and tessellations.

use anyhow::Result;

use crate::Point;
use crate::geom::mesh::Mesh;

/// Requested tessellation fidelity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshDensity {
    /// Provider's fixed cheap setting, used for occlusion tests.
    Coarse,
    /// Target edge length (used as both minimum and maximum edge length).
    EdgeLength(f64),
}

/// Supplies closest-point queries and tessellations for bounding surfaces.
///
/// Implementations are shared by all workers of a run and must be `Sync`.
/// Mesh faces must be triangles or quads wound counter-clockwise around
/// the surface normal, which points away from the enclosure interior.
pub trait GeometryProvider: Sync {
    type Surface: Sync;

    /// Closest point on `surface` to `pt`.
    fn closest_point(&self, surface: &Self::Surface, pt: Point) -> Result<Point>;

    /// Tessellates `surface` at the requested density.
    fn tessellate(&self, surface: &Self::Surface, density: MeshDensity) -> Result<Mesh>;
}
