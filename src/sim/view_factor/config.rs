use serde::{Deserialize, Serialize};

use crate::error::{Result, VfError};

/// Largest supported sky-patch subdivision level.
pub const MAX_VIEW_RESOLUTION: u8 = 4;

/// What to do when a single (point, surface) pair fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairErrorPolicy {
    /// Fail the whole run with the pair's error.
    #[default]
    Abort,
    /// Give the pair a zero contribution and report a warning.
    Degrade,
}

/// Configuration of a view factor run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewFactorConfig {
    /// Detail mesh edge length as a fraction of the point-to-surface distance.
    pub grid_size: f64,
    /// Lower bound of the detail edge length (points on or very near a surface).
    pub min_edge_length: f64,
    /// Offset of generated sample points from their reference surface.
    pub distance_from_reference: f64,
    /// Sky-patch subdivision level (0..=4).
    pub view_resolution: u8,
    /// Drop air walls from occlusion and view factor accounting.
    pub remove_air_walls: bool,
    /// Report the outdoor view factor (sky + outdoor-boundary surfaces) per point.
    pub include_outdoor: bool,
    /// Run pairs on a worker pool instead of the calling thread.
    pub parallel: bool,
    /// Worker pool size. `None` uses one worker per logical CPU.
    pub num_workers: Option<usize>,
    pub pair_error_policy: PairErrorPolicy,
    /// Keep detail meshes and view rays in the result (memory heavy).
    pub keep_byproducts: bool,
    /// Also trace sky-patch rays from every point to estimate its sky view.
    pub ray_sky_view: bool,
}

impl ViewFactorConfig {
    pub fn new() -> Self {
        Self {
            grid_size: 0.1,
            min_edge_length: 0.01,
            distance_from_reference: 0.75,
            view_resolution: 0,
            remove_air_walls: true,
            include_outdoor: false,
            parallel: true,
            num_workers: None,
            pair_error_policy: PairErrorPolicy::Abort,
            keep_byproducts: false,
            ray_sky_view: false,
        }
    }

    /// Checks the scalars before any geometry work starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.grid_size.is_finite() && self.grid_size > 0.) {
            return Err(VfError::InvalidConfiguration(format!(
                "grid_size must be > 0, got {}",
                self.grid_size
            )));
        }
        if !(self.min_edge_length.is_finite() && self.min_edge_length > 0.) {
            return Err(VfError::InvalidConfiguration(format!(
                "min_edge_length must be > 0, got {}",
                self.min_edge_length
            )));
        }
        if !(self.distance_from_reference.is_finite() && self.distance_from_reference >= 0.) {
            return Err(VfError::InvalidConfiguration(format!(
                "distance_from_reference must be >= 0, got {}",
                self.distance_from_reference
            )));
        }
        if self.view_resolution > MAX_VIEW_RESOLUTION {
            return Err(VfError::InvalidConfiguration(format!(
                "view_resolution must be in 0..={MAX_VIEW_RESOLUTION}, got {}",
                self.view_resolution
            )));
        }
        if self.num_workers == Some(0) {
            return Err(VfError::InvalidConfiguration(
                "num_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Detail mesh target edge length for a point at `distance` from a surface.
    pub fn detail_edge_length(&self, distance: f64) -> f64 {
        (self.grid_size * distance).max(self.min_edge_length)
    }
}

impl Default for ViewFactorConfig {
    fn default() -> Self {
        Self::new()
    }
}
