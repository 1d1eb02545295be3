//! Point-to-surface distances used to size detail meshes.

use ndarray as nd;
use serde::{Deserialize, Serialize};

use crate::Point;
use crate::error::{Result, VfError};
use crate::sim::view_factor::provider::GeometryProvider;

/// Euclidean distance from `pt` to the closest point of a surface.
///
/// `point` and `surface` are the indices reported on failure.
pub fn distance<P: GeometryProvider>(
    provider: &P,
    geometry: &P::Surface,
    pt: Point,
    point: usize,
    surface: usize,
) -> Result<f64> {
    let closest = provider
        .closest_point(geometry, pt)
        .map_err(|e| VfError::Geometry {
            point,
            surface,
            reason: format!("{e:#}"),
        })?;
    let d = pt.distance_to(&closest);
    if !d.is_finite() {
        return Err(VfError::Geometry {
            point,
            surface,
            reason: format!("closest point {closest} gives a non-finite distance"),
        });
    }
    Ok(d)
}

/// Distances for every (sample point, surface) pair.
///
/// Pairs that were not computed (skipped or failed) have no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceTable {
    values: nd::Array2<f64>,
}

impl DistanceTable {
    pub fn new(n_points: usize, n_surfaces: usize) -> Self {
        Self {
            values: nd::Array2::from_elem((n_points, n_surfaces), f64::NAN),
        }
    }

    pub fn set(&mut self, point: usize, surface: usize, d: f64) {
        if let Some(v) = self.values.get_mut((point, surface)) {
            *v = d;
        }
    }

    pub fn get(&self, point: usize, surface: usize) -> Option<f64> {
        self.values
            .get((point, surface))
            .copied()
            .filter(|d| !d.is_nan())
    }
}
