//! Surface discretization into coarse occluder meshes and distance-adaptive
//! detail meshes.

use crate::error::{Result, VfError};
use crate::geom::mesh::Mesh;
use crate::sim::view_factor::provider::{GeometryProvider, MeshDensity};

/// Coarse occluder mesh of surface `surface`, shared by all points.
pub fn coarse_mesh<P: GeometryProvider>(
    provider: &P,
    geometry: &P::Surface,
    surface: usize,
) -> Result<Mesh> {
    tessellate(provider, geometry, MeshDensity::Coarse, surface, None)
}

/// Detail mesh of `surface` for sample point `point`.
///
/// `edge_length` is used as both the minimum and maximum target edge length.
pub fn detail_mesh<P: GeometryProvider>(
    provider: &P,
    geometry: &P::Surface,
    edge_length: f64,
    point: usize,
    surface: usize,
) -> Result<Mesh> {
    if !(edge_length.is_finite() && edge_length > 0.) {
        return Err(VfError::InvalidConfiguration(format!(
            "detail edge length must be > 0, got {edge_length}"
        )));
    }
    tessellate(
        provider,
        geometry,
        MeshDensity::EdgeLength(edge_length),
        surface,
        Some(point),
    )
}

fn tessellate<P: GeometryProvider>(
    provider: &P,
    geometry: &P::Surface,
    density: MeshDensity,
    surface: usize,
    point: Option<usize>,
) -> Result<Mesh> {
    let mesh = provider
        .tessellate(geometry, density)
        .map_err(|e| VfError::Discretization {
            surface,
            point,
            reason: format!("{e:#}"),
        })?;
    if mesh.is_empty() {
        return Err(VfError::Discretization {
            surface,
            point,
            reason: "tessellation produced no faces".to_string(),
        });
    }
    Ok(mesh)
}
