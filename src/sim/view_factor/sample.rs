//! Sample point grids over a reference surface.

use anyhow::{Result, anyhow};

use crate::Point;
use crate::geom::mesh::raw_face_normal;
use crate::sim::view_factor::provider::{GeometryProvider, MeshDensity};

/// Generates sample points at the face centers of `reference` tessellated at
/// `cell_size`, moved `distance_from_reference` to the interior side
/// (against the outward surface normal).
pub fn sample_points<P: GeometryProvider>(
    provider: &P,
    reference: &P::Surface,
    cell_size: f64,
    distance_from_reference: f64,
) -> Result<Vec<Point>> {
    if !(cell_size.is_finite() && cell_size > 0.) {
        return Err(anyhow!("Sample grid cell size must be > 0, got {cell_size}"));
    }
    if !(distance_from_reference.is_finite() && distance_from_reference >= 0.) {
        return Err(anyhow!(
            "Distance from reference surface must be >= 0, got {distance_from_reference}"
        ));
    }
    let mesh = provider.tessellate(reference, MeshDensity::EdgeLength(cell_size))?;

    let mut points = Vec::with_capacity(mesh.face_count());
    for k in 0..mesh.face_count() {
        let pts = mesh.face_points(k)?;
        let Ok(normal) = raw_face_normal(&pts).and_then(|n| n.normalize()) else {
            continue;
        };
        let center = mesh.face_center(k)?;
        points.push(center + normal * -distance_from_reference);
    }
    if points.is_empty() {
        return Err(anyhow!("Reference surface produced no sample points"));
    }
    log::debug!("Generated {} sample points", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::view_factor::planar::PlanarProvider;
    use crate::{Polygon, Vector};

    #[test]
    fn test_floor_grid() -> Result<()> {
        let floor = Polygon::new(
            "floor".to_string(),
            vec![
                Point::new(0., 0., 0.),
                Point::new(2., 0., 0.),
                Point::new(2., 1., 0.),
                Point::new(0., 1., 0.),
            ],
            Some(Vector::new(0., 0., -1.)),
        )?;
        let points = sample_points(&PlanarProvider::new(), &floor, 0.5, 0.75)?;
        assert_eq!(points.len(), 8);
        for p in &points {
            assert!((p.z - 0.75).abs() < 1e-12);
            assert!(p.x > 0. && p.x < 2. && p.y > 0. && p.y < 1.);
        }
        Ok(())
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let floor = Polygon::new(
            "floor".to_string(),
            vec![
                Point::new(0., 0., 0.),
                Point::new(1., 0., 0.),
                Point::new(1., 1., 0.),
            ],
            None,
        )
        .unwrap();
        assert!(sample_points(&PlanarProvider::new(), &floor, 0., 0.5).is_err());
        assert!(sample_points(&PlanarProvider::new(), &floor, 0.5, -1.).is_err());
    }
}
